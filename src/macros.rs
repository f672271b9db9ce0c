/// Generates the field-by-field merge of a patch into a record.
///
/// Every named field is expected to exist on both structs, as `T` on the
/// record and `Option<T>` on the patch. Fields left as `None` in the patch are
/// not touched, which is what makes the merge shallow and non-destructive.
///
/// # Example
/// ```rust
/// merge_fields!(record, patch, business_name, vision);
/// ```
/// expands to:
/// ```rust
/// if let Some(value) = patch.business_name { record.business_name = value; }
/// if let Some(value) = patch.vision { record.vision = value; }
/// ```
#[macro_export]
macro_rules! merge_fields {
    ($record:expr, $patch:expr, $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $record.$field = value;
            }
        )*
    };
}
