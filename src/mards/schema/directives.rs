//! Schema vocabulary
//!
//! The closed set of element names a schema may use. The compiler's first
//! sweep reports and removes anything outside this set, so later passes
//! only ever see recognized elements.

/// Header element that opens a schema document
pub const HEADER: &str = "#!MARDS_schema_en_1.0";

/// Comment element, always stripped during compilation
pub const NOTE: &str = "##";

/// Whether `name` belongs to the schema vocabulary
pub fn is_recognized(name: &str) -> bool {
    matches!(
        name,
        // declarations
        "name" | "template"
        // header and imports
        | "#!MARDS_schema_en_1.0" | "import" | "local" | "exclusive"
        // rule properties
        | "treatment" | "value" | "required" | "default" | "ordered"
        // expansion macros
        | "insert" | "recurse" | "extend" | "from" | "limit"
        // documentation
        | "describe" | "title" | "abstract" | "body" | "reference" | "author"
        | "url" | "journal" | "book" | "date_written" | "date_retreived" // sic
        | "pages" | "paragraphs" | "copyright_message" | "publisher"
        // conditionals
        | "search" | "match" | "match_else"
        // raised messages
        | "raise_error" | "raise_warning" | "raise_log"
        // typing
        | "type" | "choice" | "min"
        | "define_type" | "unit" | "*"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_vocabulary_recognized() {
        assert!(is_recognized("name"));
        assert!(is_recognized("template"));
        assert!(is_recognized(HEADER));
        assert!(is_recognized("insert"));
        assert!(is_recognized("recurse"));
        assert!(is_recognized("extend"));
        assert!(is_recognized("*"));
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(!is_recognized("color"));
        assert!(!is_recognized(""));
        assert!(!is_recognized("Name"));
        assert!(!is_recognized("##"));
    }
}
