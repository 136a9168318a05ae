//! Export pipeline entry point and two-pass render (spec §4.M, 10% weight).
//! Grounded on the teacher's `Document::to_pdf_bytes`/`Fragment::paint_onto`
//! pairing in `paint.rs`: that single-pass walk is generalized here into
//! two passes because glyph ids for CID fonts aren't known until every
//! fragment that uses them has been seen once.

use crate::model::node::ElementKind;
use crate::model::traversal::{traverse_by_type, traverse_texts};
use crate::model::Document;
use crate::errors::ExportError;
use crate::pdf::content::ContentBuilder;
use crate::pdf::fonts::{FontRef, FontRegistry};
use crate::pdf::layout_contract::{Block, LayoutRect, LayoutResult, Page as LayoutPage};
use crate::pdf::object::{dict, Object, ObjectId};
use crate::pdf::painters;
use crate::pdf::structure_tree;
use crate::pdf::writer::PdfWriter;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

fn default_true() -> bool {
    true
}

/// The crate's one externally-facing configuration surface (spec §4.M
/// `exportToPdf(document, options?)`), deserializable so a host can load it
/// from JSON/TOML alongside the rest of its configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ExportOptions {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    #[serde(default = "default_true")]
    pub compress: bool,
    #[serde(default)]
    pub tagged: bool,
    pub lang: Option<String>,
    /// Caller-supplied font buffers keyed by `"<family lower>:[bold][:italic]"`.
    #[serde(default)]
    pub fonts: HashMap<String, Vec<u8>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            title: None,
            author: None,
            subject: None,
            keywords: None,
            creator: None,
            compress: true,
            tagged: false,
            lang: None,
            fonts: HashMap::new(),
        }
    }
}

/// Renders `document`'s already-computed `layout` to a PDF 1.4 byte stream
/// (spec §4.M). `layout` is the external layout engine's output (spec §6);
/// this crate does not perform line breaking or pagination itself.
#[instrument(level = "debug", skip(document, layout, options))]
pub fn export_to_pdf(document: &Document, layout: &LayoutResult, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let mut fonts = FontRegistry::new();
    for (key, data) in &options.fonts {
        if let Err(err) = register_prebuilt_font(&mut fonts, key, data.clone()) {
            tracing::warn!(font_key = %key, error = %err, "failed to parse caller-supplied font, falling back to Standard 14");
        }
    }

    // Pass 1: paint a provisional content stream per page purely to drive
    // CID font codepoint collection; the bytes themselves are discarded.
    for page in &layout.pages {
        let mut scratch = ContentBuilder::new();
        // Marked-content wrapping doesn't affect which glyphs get drawn, so
        // pass 1 never needs to tag — it exists purely to collect codepoints.
        paint_page(&mut scratch, &mut fonts, &document.media, page, false);
    }

    let mut writer = PdfWriter::new();
    let mut image_cache: HashMap<String, ObjectId> = HashMap::new();
    let mut font_ids: HashMap<String, ObjectId> = HashMap::new();
    let mut page_ids = Vec::with_capacity(layout.pages.len());
    let mut page_struct_elems: Vec<Vec<ObjectId>> = Vec::with_capacity(layout.pages.len());

    let pages_root = writer.reserve();
    let struct_root = if options.tagged { Some(writer.reserve()) } else { None };

    // Pass 2: final render now that every CID font's used-glyph set is complete.
    for (page_index, page) in layout.pages.iter().enumerate() {
        let mut content = ContentBuilder::new();
        let (used_fonts, used_images, links, roles) = paint_page(&mut content, &mut fonts, &document.media, page, options.tagged);

        // Both lists are in the same first-seen order the paint pass assigned
        // `F1`/`Im1`, `F2`/`Im2`, … under, so position alone reproduces the
        // name each `Tf`/`Do` operator in the content stream already used.
        // Font/image *objects* are still deduplicated once per distinct
        // resource across the whole document via `font_ids`/`image_cache`.
        let mut resources_fonts = Vec::new();
        for (i, font_ref) in used_fonts.iter().enumerate() {
            let resource_key = font_resource_key(font_ref);
            let id = *font_ids.entry(resource_key).or_insert_with(|| fonts.build_font_object(&mut writer, font_ref));
            resources_fonts.push((format!("F{}", i + 1), Object::Reference(id)));
        }

        let mut xobjects = Vec::new();
        for (i, media_id) in used_images.iter().enumerate() {
            let asset = &document.media[media_id];
            let id = *image_cache.entry(media_id.clone()).or_insert_with(|| add_image_xobject(&mut writer, asset));
            xobjects.push((format!("Im{}", i + 1), Object::Reference(id)));
        }

        let stream_dict = if options.compress { vec![] } else { dict! { "Filter" => Object::Null } };
        let content_id = writer.add(Object::Stream(stream_dict, content.into_bytes()));

        let resources = Object::Dictionary(dict! {
            "Font" => Object::Dictionary(resources_fonts.clone()),
            "XObject" => Object::Dictionary(xobjects),
        });

        let annot_ids: Vec<ObjectId> = links.iter().map(|(rect, href)| build_link_annotation(&mut writer, rect, page.height, href)).collect();

        let mut page_entries = dict! {
            "Type" => "Page",
            "Parent" => pages_root,
            "MediaBox" => Object::Array(vec![Object::Int(0), Object::Int(0), Object::rounded(page.width), Object::rounded(page.height)]),
            "Resources" => resources,
            "Contents" => content_id,
        };
        if !annot_ids.is_empty() {
            page_entries.push(("Annots".to_string(), Object::Array(annot_ids.into_iter().map(Object::Reference).collect())));
        }
        if options.tagged {
            page_entries.push(("StructParents".to_string(), Object::Int(page_index as i64)));
        }

        let page_id = writer.add(Object::Dictionary(page_entries));
        page_ids.push(page_id);

        if let Some(struct_root) = struct_root {
            page_struct_elems.push(structure_tree::build_page_struct_elems(&mut writer, struct_root, page_id, &roles));
        }
    }

    writer.fill(
        pages_root,
        Object::Dictionary(dict! {
            "Type" => "Pages",
            "Kids" => Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            "Count" => page_ids.len() as i64,
        }),
    );

    if let Some(struct_root) = struct_root {
        structure_tree::fill_struct_tree_root(&mut writer, struct_root, &page_struct_elems);
    }

    let outline_root = build_outlines(&mut writer, document);

    let mut catalog_entries = dict! {
        "Type" => "Catalog",
        "Pages" => pages_root,
    };
    if let Some(outline_root) = outline_root {
        catalog_entries.push(("Outlines".to_string(), Object::Reference(outline_root)));
    }
    if let Some(lang) = &options.lang {
        catalog_entries.push(("Lang".to_string(), Object::literal_string(lang.as_str())));
    }
    if options.tagged {
        catalog_entries.push(("MarkInfo".to_string(), Object::Dictionary(dict! { "Marked" => true })));
    }
    if let Some(struct_root) = struct_root {
        catalog_entries.push(("StructTreeRoot".to_string(), Object::Reference(struct_root)));
    }
    let catalog = writer.add(Object::Dictionary(catalog_entries));

    let info = build_info_dict(&mut writer, options);

    writer.generate(catalog, info)
}

fn font_resource_key(font_ref: &FontRef) -> String {
    match font_ref {
        FontRef::Standard14(base) => format!("std14:{}", base.base_font_name()),
        FontRef::Cid(key) => format!("cid:{key}"),
    }
}

fn register_prebuilt_font(fonts: &mut FontRegistry, key: &str, data: Vec<u8>) -> Result<(), crate::errors::FontError> {
    // "<family>:[bold]:[italic]" — split back out to reuse the registry's keyed-by-triple API.
    let mut parts = key.splitn(3, ':');
    let family = parts.next().unwrap_or_default();
    let bold = parts.next() == Some("bold");
    let italic = parts.next() == Some("italic");
    fonts.register_font_buffer(family, bold, italic, data)
}

/// Paints every block on a page and returns the distinct fonts and media ids
/// it used (each in first-seen order, stable, since `exportToPdf` must be
/// deterministic), the `(rect, href)` pairs that need a `/Annot /Link`, and —
/// when `tagged` — the structure role of each top-level block in MCID order.
fn paint_page(
    content: &mut ContentBuilder,
    fonts: &mut FontRegistry,
    media: &HashMap<String, crate::model::MediaAsset>,
    page: &LayoutPage,
    tagged: bool,
) -> (Vec<FontRef>, Vec<String>, Vec<(LayoutRect, String)>, Vec<&'static str>) {
    let mut used_fonts = Vec::new();
    let mut used_images = Vec::new();
    let mut links = Vec::new();
    let mut roles = Vec::new();

    if let Some(header) = &page.header {
        paint_top_level_block(content, fonts, &mut used_fonts, &mut used_images, &mut links, media, page.height, tagged, &mut roles, header);
    }
    for block in &page.blocks {
        paint_top_level_block(content, fonts, &mut used_fonts, &mut used_images, &mut links, media, page.height, tagged, &mut roles, block);
    }
    for float in &page.floats {
        paint_top_level_block(content, fonts, &mut used_fonts, &mut used_images, &mut links, media, page.height, tagged, &mut roles, float);
    }
    if let Some(footer) = &page.footer {
        paint_top_level_block(content, fonts, &mut used_fonts, &mut used_images, &mut links, media, page.height, tagged, &mut roles, footer);
    }
    (used_fonts, used_images, links, roles)
}

/// Paints one page-level block, optionally wrapping it in a marked-content
/// section tagged with the block's structure role (spec §4.M "optional
/// tagged-PDF structure tree"). Nested blocks (e.g. a table cell's
/// paragraphs) aren't separately tagged — one `/StructElem` per top-level
/// page block keeps the tree flat, still enough for every page to be
/// reachable from `/StructTreeRoot`.
fn paint_top_level_block(
    content: &mut ContentBuilder,
    fonts: &mut FontRegistry,
    used_fonts: &mut Vec<FontRef>,
    used_images: &mut Vec<String>,
    links: &mut Vec<(LayoutRect, String)>,
    media: &HashMap<String, crate::model::MediaAsset>,
    page_height: f64,
    tagged: bool,
    roles: &mut Vec<&'static str>,
    block: &Block,
) {
    if tagged {
        let role = structure_tree::role_for(block);
        let mcid = roles.len() as u32;
        content.begin_marked_content(role, mcid);
        paint_block(content, fonts, used_fonts, used_images, links, media, page_height, block);
        content.end_marked_content();
        roles.push(role);
    } else {
        paint_block(content, fonts, used_fonts, used_images, links, media, page_height, block);
    }
}

/// Resolves a fragment's font and returns the `/Resources /Font` name it
/// should be painted under, assigning a fresh `F<n>` the first time a given
/// font identity is seen on this page and reusing it afterward so every
/// fragment in a shared font draws against one resource entry.
fn resource_name_for(used: &mut Vec<FontRef>, font_ref: FontRef) -> String {
    let key = font_resource_key(&font_ref);
    let position = used.iter().position(|f| font_resource_key(f) == key).unwrap_or_else(|| {
        used.push(font_ref);
        used.len() - 1
    });
    format!("F{}", position + 1)
}

/// Same first-seen-wins scheme as [`resource_name_for`], keyed by media id
/// instead of font identity.
fn image_name_for(used: &mut Vec<String>, media_id: &str) -> String {
    let position = used.iter().position(|m| m == media_id).unwrap_or_else(|| {
        used.push(media_id.to_string());
        used.len() - 1
    });
    format!("Im{}", position + 1)
}

fn paint_block(
    content: &mut ContentBuilder,
    fonts: &mut FontRegistry,
    used_fonts: &mut Vec<FontRef>,
    used_images: &mut Vec<String>,
    links: &mut Vec<(LayoutRect, String)>,
    media: &HashMap<String, crate::model::MediaAsset>,
    page_height: f64,
    block: &Block,
) {
    match block {
        Block::Paragraph(paragraph) => {
            for line in &paragraph.lines {
                for fragment in &line.fragments {
                    let font_ref = fonts.resolve(&fragment.style.font_family, fragment.style.bold, fragment.style.italic);
                    let name = resource_name_for(used_fonts, font_ref.clone());
                    painters::paint_text_fragment(content, fonts, &font_ref, &name, page_height, fragment);
                    if let Some(href) = &fragment.href {
                        links.push((fragment.rect, href.clone()));
                    }
                }
            }
        }
        Block::Table(table) => {
            painters::paint_table(content, table, page_height);
            for row in &table.rows {
                for cell in &row.cells {
                    for nested in &cell.content {
                        paint_block(content, fonts, used_fonts, used_images, links, media, page_height, nested);
                    }
                }
            }
        }
        Block::Image(image) => {
            if media.contains_key(&image.src_media_id) {
                let name = image_name_for(used_images, &image.src_media_id);
                content.save_state();
                content.concat_matrix(image.rect.width, 0.0, 0.0, image.rect.height, image.rect.x, page_height - image.rect.y - image.rect.height);
                content.paint_xobject(&name);
                content.restore_state();
            } else {
                tracing::warn!(media_id = %image.src_media_id, "missing media asset, skipping image");
            }
        }
        Block::Shape(shape) => painters::paint_shape(content, shape, page_height),
    }
}

/// One `/Annot /Subtype /Link` per hyperlinked text fragment (spec §"PDF
/// file format emitted"), flipping the fragment's top-left-origin rect into
/// PDF's bottom-left-origin `/Rect [llx lly urx ury]`.
fn build_link_annotation(writer: &mut PdfWriter, rect: &LayoutRect, page_height: f64, href: &str) -> ObjectId {
    let lly = page_height - rect.y - rect.height;
    let ury = page_height - rect.y;
    writer.add(Object::Dictionary(dict! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => Object::Array(vec![Object::rounded(rect.x), Object::rounded(lly), Object::rounded(rect.x + rect.width), Object::rounded(ury)]),
        "Border" => Object::Array(vec![Object::Int(0), Object::Int(0), Object::Int(0)]),
        "A" => Object::Dictionary(dict! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::literal_string(href),
        }),
    }))
}

fn add_image_xobject(writer: &mut PdfWriter, asset: &crate::model::MediaAsset) -> ObjectId {
    let filter = match asset.mime_type.as_str() {
        "image/jpeg" => "DCTDecode",
        _ => "FlateDecode",
    };
    writer.add(Object::Stream(
        dict! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Filter" => filter,
        },
        asset.bytes.to_vec(),
    ))
}

/// Flat doubly-linked-list outline (spec §4.M/§"PDF file format emitted"),
/// one entry per paragraph the document marks with an outline level.
fn build_outlines(writer: &mut PdfWriter, document: &Document) -> Option<ObjectId> {
    let titles: Vec<String> = traverse_by_type(&document.root, "paragraph")
        .filter_map(|visit| {
            let element = visit.node.as_element()?;
            let ElementKind::Paragraph(properties) = &element.kind else { return None };
            properties.outline_level?;
            let text = collect_text(&visit.node);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect();

    if titles.is_empty() {
        return None;
    }

    let root = writer.reserve();
    let item_ids: Vec<ObjectId> = titles.iter().map(|_| writer.reserve()).collect();
    for (i, title) in titles.iter().enumerate() {
        let mut entry = dict! {
            "Title" => Object::literal_string(title.as_str()),
            "Parent" => root,
        };
        if i > 0 {
            entry.push(("Prev".to_string(), Object::Reference(item_ids[i - 1])));
        }
        if i + 1 < item_ids.len() {
            entry.push(("Next".to_string(), Object::Reference(item_ids[i + 1])));
        }
        writer.fill(item_ids[i], Object::Dictionary(entry));
    }
    writer.fill(
        root,
        Object::Dictionary(dict! {
            "Type" => "Outlines",
            "First" => item_ids[0],
            "Last" => *item_ids.last().unwrap(),
            "Count" => item_ids.len() as i64,
        }),
    );
    Some(root)
}

fn collect_text(paragraph: &Arc<crate::model::Node>) -> String {
    traverse_texts(paragraph).filter_map(|visit| visit.node.text().map(|t| t.to_string())).collect::<Vec<_>>().join("")
}

fn build_info_dict(writer: &mut PdfWriter, options: &ExportOptions) -> Option<ObjectId> {
    let mut entries = Vec::new();
    if let Some(title) = &options.title {
        entries.push(("Title".to_string(), Object::literal_string(title.as_str())));
    }
    if let Some(author) = &options.author {
        entries.push(("Author".to_string(), Object::literal_string(author.as_str())));
    }
    if let Some(subject) = &options.subject {
        entries.push(("Subject".to_string(), Object::literal_string(subject.as_str())));
    }
    if let Some(keywords) = &options.keywords {
        entries.push(("Keywords".to_string(), Object::literal_string(keywords.as_str())));
    }
    if let Some(creator) = &options.creator {
        entries.push(("Creator".to_string(), Object::literal_string(creator.as_str())));
    }
    if entries.is_empty() {
        None
    } else {
        Some(writer.add(Object::Dictionary(entries)))
    }
}
