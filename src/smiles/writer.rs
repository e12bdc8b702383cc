use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ranks;
use crate::element;
use crate::graph_ops::connected_components;
use crate::mol::Mol;
use crate::valence::implicit_hydrogen_count;

/// Write SMILES in input atom order.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    let components = connected_components(mol);
    let parts: Vec<String> = components
        .iter()
        .map(|c| write_fragment(mol, c, None))
        .collect();
    parts.join(".")
}

/// Write canonical SMILES: traversal driven by canonical ranks, fragment
/// strings sorted. Equal strings iff the graphs are treated as identical.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks = canonical_ranks(mol);
    let components = connected_components(mol);
    let mut parts: Vec<String> = components
        .iter()
        .map(|c| write_fragment(mol, c, Some(&ranks)))
        .collect();
    parts.sort();
    parts.join(".")
}

struct RingClosure {
    ring_id: usize,
    order: BondOrder,
    other: NodeIndex,
}

struct DfsContext {
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingClosure>>,
    ring_closes: Vec<Vec<RingClosure>>,
}

fn write_fragment(mol: &Mol<Atom, Bond>, component: &[NodeIndex], ranks: Option<&[usize]>) -> String {
    let n = mol.atom_count();
    let start = match ranks {
        Some(r) => *component
            .iter()
            .min_by_key(|&&node| r[node.index()])
            .expect("component is non-empty"),
        None => component[0],
    };

    let neighbor_lists: Vec<Vec<NodeIndex>> = (0..n)
        .map(|i| {
            let mut neighbors: Vec<NodeIndex> = mol.neighbors(NodeIndex::new(i)).collect();
            match ranks {
                Some(r) => neighbors.sort_by_key(|nb| r[nb.index()]),
                None => neighbors.sort(),
            }
            neighbors
        })
        .collect();

    let mut visited = vec![false; n];
    let mut parent = vec![None::<NodeIndex>; n];
    let mut children: Vec<Vec<NodeIndex>> = (0..n).map(|_| Vec::new()).collect();
    let mut ring_opens: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut ring_closes: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut next_ring_id: usize = 1;

    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
    visited[start.index()] = true;
    stack.push((start, 0));

    while let Some(&mut (node, ref mut ni)) = stack.last_mut() {
        let neighbors = &neighbor_lists[node.index()];
        if *ni >= neighbors.len() {
            stack.pop();
            continue;
        }
        let neighbor = neighbors[*ni];
        *ni += 1;

        if !visited[neighbor.index()] {
            visited[neighbor.index()] = true;
            parent[neighbor.index()] = Some(node);
            children[node.index()].push(neighbor);
            stack.push((neighbor, 0));
        } else if parent[node.index()] != Some(neighbor) {
            // back edge; open the ring at the ancestor, close it here
            let already = ring_opens[neighbor.index()].iter().any(|rc| {
                ring_closes[node.index()]
                    .iter()
                    .any(|rc2| rc2.ring_id == rc.ring_id)
            }) || ring_opens[node.index()].iter().any(|rc| {
                ring_closes[neighbor.index()]
                    .iter()
                    .any(|rc2| rc2.ring_id == rc.ring_id)
            });
            if !already {
                let edge = mol
                    .bond_between(node, neighbor)
                    .expect("back edge exists in graph");
                let order = mol.bond(edge).order;
                let ring_id = next_ring_id;
                next_ring_id += 1;
                ring_opens[neighbor.index()].push(RingClosure {
                    ring_id,
                    order,
                    other: node,
                });
                ring_closes[node.index()].push(RingClosure {
                    ring_id,
                    order,
                    other: neighbor,
                });
            }
        }
    }

    let ctx = DfsContext {
        children,
        ring_opens,
        ring_closes,
    };

    let mut out = String::new();
    write_node(mol, start, &ctx, &mut out);
    out
}

fn write_node(mol: &Mol<Atom, Bond>, node: NodeIndex, ctx: &DfsContext, out: &mut String) {
    write_atom(mol, node, out);
    for rc in &ctx.ring_opens[node.index()] {
        out.push_str(bond_token(mol, node, rc.other, rc.order));
        push_ring_id(rc.ring_id, out);
    }
    for rc in &ctx.ring_closes[node.index()] {
        push_ring_id(rc.ring_id, out);
    }
    let children = &ctx.children[node.index()];
    for (i, &child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        if !last {
            out.push('(');
        }
        let edge = mol
            .bond_between(node, child)
            .expect("tree edge exists in graph");
        out.push_str(bond_token(mol, node, child, mol.bond(edge).order));
        write_node(mol, child, ctx, out);
        if !last {
            out.push(')');
        }
    }
}

fn push_ring_id(ring_id: usize, out: &mut String) {
    if ring_id < 10 {
        out.push(char::from_digit(ring_id as u32, 10).expect("single digit"));
    } else {
        out.push('%');
        out.push_str(&ring_id.to_string());
    }
}

fn bond_token(mol: &Mol<Atom, Bond>, a: NodeIndex, b: NodeIndex, order: BondOrder) -> &'static str {
    let both_aromatic = mol.atom(a).is_aromatic && mol.atom(b).is_aromatic;
    match order {
        BondOrder::Single => {
            if both_aromatic {
                "-"
            } else {
                ""
            }
        }
        BondOrder::Aromatic => {
            if both_aromatic {
                ""
            } else {
                ":"
            }
        }
        BondOrder::Double => "=",
        BondOrder::Triple => "#",
    }
}

fn write_atom(mol: &Mol<Atom, Bond>, node: NodeIndex, out: &mut String) {
    let atom = mol.atom(node);
    let sum2: u16 = mol
        .bonds_of(node)
        .map(|e| mol.bond(e).order.doubled() as u16)
        .sum();
    let bare_h = implicit_hydrogen_count(atom.atomic_num, 0, sum2);

    let bare_symbol_ok = if atom.is_aromatic {
        element::is_organic_subset(atom.atomic_num)
            && element::aromatic_symbol(atom.atomic_num).is_some()
    } else {
        element::is_organic_subset(atom.atomic_num)
    };

    if atom.formal_charge == 0
        && atom.isotope == 0
        && atom.map_num == 0
        && bare_symbol_ok
        && atom.hydrogen_count == bare_h
    {
        let sym = if atom.is_aromatic {
            element::aromatic_symbol(atom.atomic_num).expect("checked above")
        } else {
            element::symbol(atom.atomic_num).expect("valid element")
        };
        out.push_str(sym);
        return;
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    let sym = if atom.is_aromatic {
        element::aromatic_symbol(atom.atomic_num)
            .or_else(|| element::symbol(atom.atomic_num))
            .unwrap_or("*")
    } else {
        element::symbol(atom.atomic_num).unwrap_or("*")
    };
    out.push_str(sym);
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{c}")),
        c => out.push_str(&format!("{c}")),
    }
    if atom.map_num != 0 {
        out.push(':');
        out.push_str(&atom.map_num.to_string());
    }
    out.push(']');
}
