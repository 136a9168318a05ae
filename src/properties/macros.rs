//! `property_record!` generates a plain `Option<T>`-per-field struct plus
//! the `get`/`set` pair the operation algebra needs to apply a
//! [`super::value::PropertyPatch`] generically, without hand-writing the
//! same match arms for every node kind's property record.

macro_rules! property_record {
    (
        $( #[$meta:meta] )*
        pub struct $Name:ident {
            $( $field:ident : $Ty:ty => $Variant:ident ),* $(,)?
        }
    ) => {
        $( #[$meta] )*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $Name {
            $( pub $field: Option<$Ty>, )*
        }

        impl $Name {
            /// All set fields, in declaration order, as `(key, value)` pairs.
            pub fn fields(&self) -> Vec<(&'static str, $crate::properties::value::PropertyValue)> {
                let mut out = Vec::new();
                $(
                    if let Some(ref v) = self.$field {
                        out.push((
                            stringify!($field),
                            $crate::properties::value::PropertyValue::$Variant(v.clone()),
                        ));
                    }
                )*
                out
            }

            pub fn get(&self, key: &str) -> Option<$crate::properties::value::PropertyValue> {
                match key {
                    $( stringify!($field) => self.$field.clone().map($crate::properties::value::PropertyValue::$Variant), )*
                    _ => None,
                }
            }

            /// Apply one patch entry: `Some(value)` sets the field (ignored if
            /// the value doesn't match the field's variant), `None` deletes it.
            pub fn set(&mut self, key: &str, value: Option<$crate::properties::value::PropertyValue>) {
                match key {
                    $(
                        stringify!($field) => {
                            self.$field = match value {
                                Some($crate::properties::value::PropertyValue::$Variant(v)) => Some(v),
                                Some(_) | None => None,
                            };
                        }
                    )*
                    _ => {}
                }
            }

            /// Produce a new record with `patch` folded in, field by field, in
            /// patch order (later entries for the same key win; spec §4.D).
            pub fn merged(&self, patch: &$crate::properties::value::PropertyPatch) -> Self {
                let mut result = self.clone();
                for (key, value) in &patch.0 {
                    result.set(key, value.clone());
                }
                result
            }

            /// A patch that would turn `other` into `self` if `self` were the
            /// base and `other` the target — used by `set_properties`'s
            /// inverse (it needs the pre-image of every touched field, even
            /// fields the forward patch deleted).
            pub fn diff_patch(&self, patch: &$crate::properties::value::PropertyPatch) -> $crate::properties::value::PropertyPatch {
                let mut old = $crate::properties::value::PropertyPatch::new();
                for (key, _) in &patch.0 {
                    old.0.push((key.clone(), self.get(key)));
                }
                old
            }
        }
    };
}

pub(crate) use property_record;
