use super::*;

pub(crate) fn tiny_table() -> ParseTable {
    let info = |name: &str, kind, visible, named| SymbolInfo {
        name: name.into(),
        kind,
        visible,
        named,
        extra: false,
    };

    ParseTable {
        name: "tiny".into(),
        symbols: vec![
            info("end", SymbolKind::Builtin, false, false),
            info("ERROR", SymbolKind::Builtin, true, true),
            info("_trivia", SymbolKind::Builtin, false, false),
            info("x", SymbolKind::Terminal, true, false),
            info("doc", SymbolKind::NonTerminal, true, true),
        ],
        terminals: vec![LexTerminal {
            symbol: SymbolId(3),
            matcher: TokenMatcher::Literal("x".into()),
        }],
        externals: vec![],
        productions: vec![Production {
            lhs: SymbolId(4),
            len: 1,
            precedence: 0,
            associativity: Associativity::None,
            aliases: vec![],
        }],
        states: vec![
            ParseState {
                actions: vec![(SymbolId(3), Action::Shift(StateId(1)))],
                gotos: vec![(SymbolId(4), StateId(2))],
            },
            ParseState {
                actions: vec![(SymbolId::END, Action::Reduce(ProductionId(0)))],
                gotos: vec![],
            },
            ParseState {
                actions: vec![(SymbolId::END, Action::Accept)],
                gotos: vec![],
            },
        ],
        start_state: StateId(0),
        start_symbol: SymbolId(4),
    }
}

#[test]
fn lookups() {
    let table = tiny_table();

    assert_eq!(table.action(StateId(0), SymbolId(3)), Some(Action::Shift(StateId(1))));
    assert_eq!(table.action(StateId(0), SymbolId::END), None);
    assert_eq!(table.goto(StateId(0), SymbolId(4)), Some(StateId(2)));
    assert_eq!(table.goto(StateId(7), SymbolId(4)), None);
    assert_eq!(table.valid_terminals(StateId(1)).collect::<Vec<_>>(), vec![SymbolId::END]);
    assert_eq!(table.symbol("doc", true), Some(SymbolId(4)));
    assert_eq!(table.symbol("doc", false), None);
    assert_eq!(table.symbol_name(SymbolId(3)), "x");
    assert_eq!(table.symbol_name(SymbolId(99)), "<unknown>");
}

#[test]
fn valid_table_passes_validation() {
    tiny_table().validate().unwrap();
}

#[test]
fn out_of_range_shift_is_malformed() {
    let mut table = tiny_table();
    table.states[0].actions[0].1 = Action::Shift(StateId(42));

    let err = table.validate().unwrap_err();
    assert!(matches!(err, LoadError::Malformed(_)));
}

#[test]
fn unsorted_rows_are_malformed() {
    let mut table = tiny_table();
    table.states[0]
        .actions
        .push((SymbolId::END, Action::Reduce(ProductionId(0))));

    let err = table.validate().unwrap_err();
    assert_eq!(err.to_string(), "malformed table: state 0 rows are not sorted");
}

#[test]
fn action_on_rule_is_malformed() {
    let mut table = tiny_table();
    table.states[2].actions = vec![(SymbolId(4), Action::Accept)];

    assert!(table.validate().is_err());
}
