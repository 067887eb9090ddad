//! Recognized GEDCOM tag tables.

pub const HEAD: &str = "HEAD";
pub const TRLR: &str = "TRLR";
pub const INDI: &str = "INDI";
pub const FAM: &str = "FAM";
pub const NOTE: &str = "NOTE";

pub const NAME: &str = "NAME";
pub const GIVN: &str = "GIVN";
pub const SURN: &str = "SURN";
pub const SEX: &str = "SEX";
pub const FAMC: &str = "FAMC";
pub const FAMS: &str = "FAMS";
pub const HUSB: &str = "HUSB";
pub const WIFE: &str = "WIFE";
pub const CHIL: &str = "CHIL";
pub const DATE: &str = "DATE";
pub const PLAC: &str = "PLAC";
pub const CONC: &str = "CONC";
pub const CONT: &str = "CONT";

pub const BIRT: &str = "BIRT";
pub const DEAT: &str = "DEAT";
pub const MARR: &str = "MARR";

/// Tag written for user labels.
pub const USER_TAG: &str = "_TAG";

/// Individual life events and attributes that open an event context.
const INDIVIDUAL_EVENT_TAGS: &[&str] = &[
    // events
    "BIRT", "CHR", "DEAT", "BURI", "CREM", "ADOP", "BAPM", "BARM", "BASM", "BLES", "CHRA",
    "CONF", "FCOM", "ORDN", "NATU", "EMIG", "IMMI", "CENS", "PROB", "WILL", "GRAD", "RETI",
    "EVEN",
    // attributes
    "CAST", "DSCR", "EDUC", "IDNO", "NATI", "NCHI", "NMR", "OCCU", "PROP", "RELI", "RESI",
    "SSN", "TITL", "FACT",
];

const FAMILY_EVENT_TAGS: &[&str] = &[
    "MARR", "ANUL", "CENS", "DIV", "DIVF", "ENGA", "MARB", "MARC", "MARL", "MARS", "RESI",
    "EVEN",
];

pub fn is_individual_event(tag: &str) -> bool {
    INDIVIDUAL_EVENT_TAGS.contains(&tag)
}

pub fn is_family_event(tag: &str) -> bool {
    FAMILY_EVENT_TAGS.contains(&tag)
}

/// Vendor-extension tags start with an underscore.
pub fn is_vendor_tag(tag: &str) -> bool {
    tag.starts_with('_')
}

/// Continuation tags keep their value verbatim instead of trimmed.
pub fn is_continuation(tag: &str) -> bool {
    tag == CONC || tag == CONT
}

#[cfg(test)]
mod tests {
    use super::{is_family_event, is_individual_event, is_vendor_tag};

    #[test]
    fn event_tables_cover_common_tags() {
        for tag in ["BIRT", "DEAT", "BURI", "OCCU", "RESI", "EVEN"] {
            assert!(is_individual_event(tag), "{tag} should be an individual event");
        }
        assert!(is_family_event("MARR"));
        assert!(is_family_event("DIV"));
        assert!(!is_individual_event("MARR"));
        assert!(!is_family_event("BIRT"));
    }

    #[test]
    fn vendor_tags_need_leading_underscore() {
        assert!(is_vendor_tag("_TAG"));
        assert!(!is_vendor_tag("TAG_"));
    }
}
