use molrewrite::{from_smiles, to_canonical_smiles, Mol, RewriteRule, RuleError, OLD_MAP_TAG};

fn mol(smiles: &str) -> Mol<molrewrite::Atom, molrewrite::Bond> {
    from_smiles(smiles).unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"))
}

fn canonical(smiles: &str) -> String {
    to_canonical_smiles(&mol(smiles))
}

#[test]
fn no_match_returns_none() {
    let rule = RewriteRule::from_rxn_smiles("[N:1][Br:2]>>[N:1]O").unwrap();
    for smi in ["C", "CCO", "c1ccccc1", "CBr"] {
        assert!(rule.apply(&mol(smi)).is_none(), "no product for {smi}");
    }
}

#[test]
fn malformed_rule_fails_before_processing() {
    assert!(matches!(
        RewriteRule::from_rxn_smiles("[C:3][C:3]>>[C:3]"),
        Err(RuleError::DuplicateMapNum {
            section: "reactant",
            map_num: 3
        })
    ));
    assert!(matches!(
        RewriteRule::from_rxn_smiles("[C:1]>>[O:2][O:2]"),
        Err(RuleError::DuplicateMapNum {
            section: "product",
            map_num: 2
        })
    ));
}

#[test]
fn batch_always_returns_one_slot_per_input() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
    let inputs: Vec<Option<_>> = vec![
        from_smiles("CBr").ok(),
        from_smiles("not a molecule").ok(),
        from_smiles("CC").ok(),
        from_smiles("BrCCC(C)Br").ok(),
    ];
    assert!(inputs[1].is_none());
    let out = rule.apply_batch(&inputs);
    assert_eq!(out.len(), inputs.len());
    assert!(out[0].is_some());
    assert!(out[1].is_none());
    assert!(out[2].is_none());
    assert!(out[3].is_some());
}

#[test]
fn batch_independence_same_input_twice() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
    let inputs = vec![Some(mol("BrCCC(C)Br")), Some(mol("CBr")), Some(mol("BrCCC(C)Br"))];
    let out = rule.apply_batch(&inputs);
    let first = to_canonical_smiles(out[0].as_ref().unwrap());
    let third = to_canonical_smiles(out[2].as_ref().unwrap());
    assert_eq!(first, third, "no state may leak between batch items");
}

#[test]
fn provenance_subset_invariant() {
    // every highlighted atom carries a label from the rule's mapping and
    // every highlighted bond joins two highlighted atoms
    let rule = RewriteRule::from_rxn_smiles("[C:1][C:2][Br:3]>>[C:1][C:2]O").unwrap();
    let product = rule.apply(&mol("CCCCBr")).unwrap();

    let block = product.prop(molrewrite::HIGHLIGHT_PROP).unwrap();
    let lines: Vec<&str> = block.lines().collect();
    assert_eq!(lines.len(), 3);
    let parse_ids = |line: &str, prefix: &str| -> Vec<usize> {
        line[prefix.len()..]
            .split_whitespace()
            .map(|t| t.parse::<usize>().unwrap() - 1)
            .collect()
    };
    let atoms = parse_ids(lines[1], "ATOMS ");
    let bonds = parse_ids(lines[2], "BONDS ");

    let rule_labels = ["1", "2"];
    for &a in &atoms {
        let atom = product.atom(petgraph::graph::NodeIndex::new(a));
        let label = atom.tag(OLD_MAP_TAG).expect("highlighted atom is labeled");
        assert!(rule_labels.contains(&label));
    }
    for &b in &bonds {
        let (x, y) = product
            .bond_endpoints(petgraph::graph::EdgeIndex::new(b))
            .unwrap();
        assert!(atoms.contains(&x.index()));
        assert!(atoms.contains(&y.index()));
    }
}

#[test]
fn products_have_no_map_numbers_left() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
    let product = rule.apply(&mol("CCBr")).unwrap();
    assert!(product.atoms().all(|i| product.atom(i).map_num == 0));
}

#[test]
fn multi_site_rewrite_converges_to_full_substitution() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
    let product = rule.apply(&mol("BrCCC(C)Br")).unwrap();
    assert_eq!(to_canonical_smiles(&product), canonical("OCCC(C)O"));
    assert!(product.atoms().all(|i| product.atom(i).atomic_num != 35));
}

#[test]
fn aromatic_substrate_substitution() {
    let rule = RewriteRule::from_rxn_smiles("[Br:2][c:1]>>[c:1]O").unwrap();
    let product = rule.apply(&mol("Brc1ccccc1")).unwrap();
    assert_eq!(to_canonical_smiles(&product), canonical("Oc1ccccc1"));
}

#[test]
fn product_of_cleaved_rule_round_trips() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][O:2]>>[C:1].[O:2]").unwrap();
    let product = rule.apply(&mol("CCOC")).unwrap();
    let out = to_canonical_smiles(&product);
    let reparsed = from_smiles(&out).unwrap();
    assert_eq!(to_canonical_smiles(&reparsed), out);
}

#[test]
fn rule_is_shareable_across_threads() {
    let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
    let inputs: Vec<Option<_>> = (0..64).map(|_| Some(mol("BrCCC(C)Br"))).collect();
    let out = rule.apply_batch(&inputs);
    let expected = canonical("OCCC(C)O");
    for slot in out {
        assert_eq!(to_canonical_smiles(slot.as_ref().unwrap()), expected);
    }
}
