use super::*;

#[test]
fn binary_preserves_rules_in_order() {
    let json = r#"{
        "name": "test",
        "rules": {
            "program": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "statement" } },
            "statement": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "PATTERN", "value": "[0-9]+" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    let binary = grammar.to_binary().unwrap();
    let decoded = Grammar::from_binary(&binary).unwrap();

    assert_eq!(decoded, grammar);
    assert_eq!(decoded.rules[0].0, "program");
}

#[test]
fn truncated_binary_is_an_error() {
    let grammar = Grammar {
        name: "test".into(),
        rules: vec![("doc".into(), Rule::string("x"))],
        extras: vec![],
        externals: vec![],
        inline: vec![],
        supertypes: vec![],
        word: None,
    };
    let binary = grammar.to_binary().unwrap();

    let err = Grammar::from_binary(&binary[..binary.len() - 1]).unwrap_err();
    assert!(matches!(err, GrammarError::Binary(_)));
}
