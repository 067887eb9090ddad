use chrono::{TimeZone, Utc};
use famtree_core::{
    write_document, Event, ExportOptions, Family, IdGenerator, Individual, Note, RecordGraph,
    RecordId, Sex, Tag,
};

fn fixed_options() -> ExportOptions {
    ExportOptions::at(Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 2).unwrap())
}

fn body_lines(text: &str) -> Vec<&str> {
    text.lines()
        .skip_while(|line| !line.starts_with("0 @"))
        .collect()
}

#[test]
fn header_is_fixed_gedcom_555_block() {
    let text = write_document(&RecordGraph::new(), &fixed_options()).unwrap();

    let expected = format!(
        "0 HEAD\n1 GEDC\n2 VERS 5.5.5\n2 FORM LINEAGE-LINKED\n3 VERS 5.5.5\n1 CHAR UTF-8\n1 SOUR FAMTREE\n2 NAME FAMTREE\n2 VERS {}\n1 DATE 5 MAR 2024\n2 TIME 09:07:02\n0 TRLR\n",
        famtree_core::core_version()
    );
    assert_eq!(text, expected);
}

#[test]
fn individual_and_family_records_follow_fixed_layout() {
    let mut ids = IdGenerator::new();
    let shared = Note::new(ids.next_id(), "Family bible");

    let mut father = Individual::new(ids.next_id()).with_name("Tom", "Berg");
    father.sex = Sex::Male;
    let mut birth = Event::new("BIRT").with_date("1 JAN 1920").with_place("Oslo");
    birth.notes.push(shared.clone());
    father.events.push(birth);
    father.notes.push(Note::new(ids.next_id(), "Sailor"));
    father.tags.push(Tag::new(ids.next_id(), "verified"));

    let child = Individual::new(ids.next_id()).with_name("Liv", "");

    let mut family = Family::new(ids.next_id());
    family.husband = Some(father.id);
    family.children.push(child.id);
    family.events.push(Event::new("MARR").with_date("1945"));
    family.notes.push(shared.clone());

    let graph = RecordGraph {
        individuals: vec![father, child],
        families: vec![family],
        ..RecordGraph::default()
    };
    let text = write_document(&graph, &fixed_options()).unwrap();

    assert_eq!(
        body_lines(&text),
        vec![
            "0 @I1@ INDI",
            "1 NAME Tom /Berg/",
            "2 SURN Berg",
            "2 GIVN Tom",
            "1 SEX M",
            "1 BIRT",
            "2 DATE 1 JAN 1920",
            "2 PLAC Oslo",
            "2 NOTE @N1@",
            "1 FAMS @F1@",
            "1 NOTE @N2@",
            "1 _TAG verified",
            "0 @I2@ INDI",
            "1 NAME Liv //",
            "2 GIVN Liv",
            "1 SEX U",
            "1 FAMC @F1@",
            "0 @F1@ FAM",
            "1 HUSB @I1@",
            "1 CHIL @I2@",
            "1 MARR",
            "2 DATE 1945",
            "1 NOTE @N1@",
            "0 @N1@ NOTE",
            "1 CONC Family bible",
            "0 @N2@ NOTE",
            "1 CONC Sailor",
            "0 TRLR",
        ]
    );
}

#[test]
fn long_single_line_note_wraps_into_conc_chunks() {
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id());
    person.notes.push(Note::new(ids.next_id(), "a".repeat(500)));
    let graph = RecordGraph {
        individuals: vec![person],
        ..RecordGraph::default()
    };

    let text = write_document(&graph, &fixed_options()).unwrap();
    let note_lines = text
        .lines()
        .skip_while(|line| *line != "0 @N1@ NOTE")
        .skip(1)
        .take_while(|line| !line.starts_with("0 "))
        .collect::<Vec<_>>();

    assert!(note_lines.len() >= 2);
    for line in &note_lines {
        let value = line.strip_prefix("1 CONC ").expect("only CONC lines expected");
        assert!(value.chars().count() <= 248);
    }
    let rebuilt = note_lines
        .iter()
        .map(|line| &line["1 CONC ".len()..])
        .collect::<String>();
    assert_eq!(rebuilt, "a".repeat(500));
}

#[test]
fn blank_note_exports_single_bare_cont() {
    let mut ids = IdGenerator::new();
    let mut family = Family::new(ids.next_id());
    family.notes.push(Note::new(ids.next_id(), ""));
    let graph = RecordGraph {
        families: vec![family],
        ..RecordGraph::default()
    };

    let text = write_document(&graph, &fixed_options()).unwrap();
    assert!(text.ends_with("0 @N1@ NOTE\n1 CONT\n0 TRLR\n"));
}

#[test]
fn identical_text_in_distinct_notes_stays_distinct() {
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id());
    person.notes.push(Note::new(ids.next_id(), "same"));
    person.notes.push(Note::new(ids.next_id(), "same"));
    let graph = RecordGraph {
        individuals: vec![person],
        ..RecordGraph::default()
    };

    let text = write_document(&graph, &fixed_options()).unwrap();
    assert!(text.contains("0 @N1@ NOTE\n1 CONC same\n"));
    assert!(text.contains("0 @N2@ NOTE\n1 CONC same\n"));
}

#[test]
fn links_to_missing_individuals_are_skipped() {
    let mut ids = IdGenerator::new();
    let mut family = Family::new(ids.next_id());
    family.wife = Some(RecordId::from_raw(404));
    family.children.push(RecordId::from_raw(405));
    let graph = RecordGraph {
        families: vec![family],
        ..RecordGraph::default()
    };

    let text = write_document(&graph, &fixed_options()).unwrap();
    assert_eq!(body_lines(&text), vec!["0 @F1@ FAM", "0 TRLR"]);
}

#[test]
fn multi_line_values_outside_notes_are_flattened() {
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id());
    person
        .events
        .push(Event::new("RESI").with_place("12 Main St\nSpringfield"));
    let graph = RecordGraph {
        individuals: vec![person],
        ..RecordGraph::default()
    };

    let text = write_document(&graph, &fixed_options()).unwrap();
    assert!(text.contains("2 PLAC 12 Main St Springfield\n"));
}
