use chrono::{TimeZone, Utc};
use famtree_core::{
    import, parse_document, write_document, ExportOptions, IdGenerator, ImportOptions, Individual,
    Note, RecordGraph, Sex,
};

const SAMPLE: &str = "\
0 HEAD
1 GEDC
2 VERS 5.5.5
1 CHAR UTF-8
0 @I1@ INDI
1 NAME Tom /Berg/
1 SEX M
1 BIRT
2 DATE ABT 1921
2 PLAC Oslo
2 NOTE @N1@
1 OCCU Sailor
1 FAMS @F1@
1 NOTE @N2@
1 _TAG verified
0 @I2@ INDI
1 NAME Eva /Lund/
1 SEX F
1 DEAT Y
1 FAMS @F1@
0 @I3@ INDI
1 NAME /Berg/
1 FAMC @F1@
1 NOTE @N3@
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 MARR
2 DATE 12 JUN 1950
1 NOTE @N1@
0 @N1@ NOTE Parish book
1 CONT page 12
0 @N2@ NOTE
1 CONT
0 @N3@ NOTE Wrote letters
1 CONT
1 CONT   indented reply
0 TRLR
";

fn fixed_options() -> ExportOptions {
    ExportOptions::at(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
}

fn strict_import(text: &str) -> RecordGraph {
    parse_document(text, &ImportOptions::strict())
        .expect("exported text must re-import strictly")
        .graph
}

#[test]
fn export_then_import_preserves_structure() {
    let original = import(SAMPLE).unwrap();
    let text = write_document(&original, &fixed_options()).unwrap();
    let reimported = strict_import(&text);

    assert_eq!(reimported.individuals.len(), 3);
    assert_eq!(reimported.families.len(), 1);

    let tom = &reimported.individuals[0];
    assert_eq!((tom.given_name.as_str(), tom.surname.as_str()), ("Tom", "Berg"));
    assert_eq!(tom.sex, Sex::Male);
    assert_eq!(tom.birth_year, Some(1921));
    assert_eq!(tom.events[1].kind, "OCCU");
    assert_eq!(tom.events[1].value, "Sailor");
    assert_eq!(tom.tags[0].name, "verified");

    let eva = &reimported.individuals[1];
    assert_eq!(eva.events[0].value, "Y");

    let child = &reimported.individuals[2];
    assert!(child.given_name.is_empty());
    assert_eq!(child.surname, "Berg");

    let family = &reimported.families[0];
    assert_eq!(family.husband, Some(tom.id));
    assert_eq!(family.wife, Some(eva.id));
    assert_eq!(family.children, vec![child.id]);
    assert_eq!(family.marriage_year, Some(1950));
}

#[test]
fn note_texts_survive_continuation_encoding() {
    let original = import(SAMPLE).unwrap();
    let text = write_document(&original, &fixed_options()).unwrap();
    let reimported = strict_import(&text);

    let tom = &reimported.individuals[0];
    assert_eq!(tom.events[0].notes[0].text, "Parish book\npage 12");
    assert_eq!(tom.notes[0].text, "");
    assert_eq!(
        reimported.individuals[2].notes[0].text,
        "Wrote letters\n\n  indented reply"
    );
    assert_eq!(tom.events[0].notes[0].id, reimported.families[0].notes[0].id);
}

#[test]
fn re_export_is_byte_identical() {
    let first = write_document(&import(SAMPLE).unwrap(), &fixed_options()).unwrap();
    let second = write_document(&strict_import(&first), &fixed_options()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn long_and_multi_line_notes_round_trip() {
    let long = format!("{}\n\n{}\n", "ä".repeat(600), "tail ".repeat(70));
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id());
    person.notes.push(Note::new(ids.next_id(), long.as_str()));
    let graph = RecordGraph {
        individuals: vec![person],
        ..RecordGraph::default()
    };

    let exported = write_document(&graph, &fixed_options()).unwrap();
    assert!(exported
        .lines()
        .all(|line| line.chars().count() <= "1 CONC ".len() + 248));

    let reimported = strict_import(&exported);
    assert_eq!(reimported.individuals[0].notes[0].text, long);
}

fn round_trip_note(text: &str) -> String {
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id());
    person.notes.push(Note::new(ids.next_id(), text));
    let graph = RecordGraph {
        individuals: vec![person],
        ..RecordGraph::default()
    };
    let exported = write_document(&graph, &fixed_options()).unwrap();
    strict_import(&exported).individuals[0].notes[0].text.clone()
}

#[test]
fn carriage_return_at_chunk_boundary_survives() {
    let text = format!("{}\rb", "a".repeat(247));
    assert_eq!(round_trip_note(&text), text);
}

#[test]
fn trailing_carriage_return_survives() {
    assert_eq!(round_trip_note("x\r"), "x\r");
    assert_eq!(round_trip_note("line\r\nnext\r"), "line\nnext\r");
}
