use super::tag::{Tag, TagKind};

fn tag(name: &str) -> Tag {
    Tag::for_name(name.to_owned())
}

#[test]
fn names_resolve_to_kinds() {
    assert_eq!(tag("DIV").kind, TagKind::Div);
    assert_eq!(tag("H1").kind, TagKind::H1);
    assert_eq!(tag("OPTION").kind, TagKind::Option);

    let custom = tag("MY-ELEMENT");
    assert_eq!(custom.kind, TagKind::Custom);
    assert_eq!(custom.name, "MY-ELEMENT");
    assert!(tag("DIV").name.is_empty());
}

#[test]
fn custom_tags_compare_by_name() {
    assert_eq!(tag("X-A"), tag("X-A"));
    assert_ne!(tag("X-A"), tag("X-B"));
    assert_ne!(tag("X-A"), tag("DIV"));
}

#[test]
fn void_elements() {
    for name in ["BR", "IMG", "INPUT", "META", "WBR", "AREA"] {
        assert!(tag(name).is_void(), "{name}");
    }
    for name in ["DIV", "P", "SCRIPT", "X-BR"] {
        assert!(!tag(name).is_void(), "{name}");
    }
}

#[test]
fn codes_round_trip() {
    for kind in [TagKind::Area, TagKind::Wbr, TagKind::Div, TagKind::Video, TagKind::Custom] {
        assert_eq!(TagKind::from_code(kind.code()), kind);
    }
    assert_eq!(TagKind::from_code(u8::MAX), TagKind::Unknown);
}

#[test]
fn paragraphs_close_before_blocks() {
    let p = tag("P");
    assert!(p.can_contain(&tag("SPAN")));
    assert!(p.can_contain(&tag("X-WIDGET")));
    assert!(!p.can_contain(&tag("DIV")));
    assert!(!p.can_contain(&tag("P")));
    assert!(!p.can_contain(&tag("OL")));
    assert!(!p.can_contain(&tag("H3")));
}

#[test]
fn list_and_table_nesting() {
    assert!(!tag("LI").can_contain(&tag("LI")));
    assert!(tag("LI").can_contain(&tag("UL")));
    assert!(!tag("DT").can_contain(&tag("DD")));
    assert!(!tag("DD").can_contain(&tag("DT")));
    assert!(!tag("TR").can_contain(&tag("TR")));
    assert!(tag("TR").can_contain(&tag("TD")));
    assert!(!tag("TD").can_contain(&tag("TH")));
    assert!(!tag("TH").can_contain(&tag("TR")));
    assert!(tag("TD").can_contain(&tag("TABLE")));
    assert!(!tag("OPTGROUP").can_contain(&tag("OPTGROUP")));
    assert!(!tag("RT").can_contain(&tag("RP")));
}

#[test]
fn colgroup_holds_only_columns() {
    let colgroup = tag("COLGROUP");
    assert!(colgroup.can_contain(&tag("COL")));
    assert!(!colgroup.can_contain(&tag("TR")));
}

#[test]
fn other_elements_contain_anything() {
    let div = tag("DIV");
    for name in ["DIV", "P", "LI", "X-Y", "SCRIPT"] {
        assert!(div.can_contain(&tag(name)), "{name}");
    }
}
