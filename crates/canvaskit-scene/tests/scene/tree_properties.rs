use canvaskit_scene::{
    Constraint, ElementConfig, ElementId, ElementTree, HorizontalConstraint, Placement, Rect,
    VerticalConstraint,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddItem { parent: usize, name: Option<u8> },
    AddFrame { parent: usize, name: Option<u8> },
    Remove { target: usize },
    Move { src: usize, dest: usize, index: Option<usize> },
    Rename { target: usize, name: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), proptest::option::of(0u8..8))
            .prop_map(|(parent, name)| Op::AddItem { parent, name }),
        (any::<usize>(), proptest::option::of(0u8..8))
            .prop_map(|(parent, name)| Op::AddFrame { parent, name }),
        any::<usize>().prop_map(|target| Op::Remove { target }),
        (any::<usize>(), any::<usize>(), proptest::option::of(0usize..6))
            .prop_map(|(src, dest, index)| Op::Move { src, dest, index }),
        (any::<usize>(), 0u8..8).prop_map(|(target, name)| Op::Rename { target, name }),
    ]
}

fn horizontal_strategy() -> impl Strategy<Value = HorizontalConstraint> {
    prop_oneof![
        Just(HorizontalConstraint::Left),
        Just(HorizontalConstraint::Right),
        Just(HorizontalConstraint::LeftRight),
        Just(HorizontalConstraint::Center),
        Just(HorizontalConstraint::Scale),
    ]
}

fn vertical_strategy() -> impl Strategy<Value = VerticalConstraint> {
    prop_oneof![
        Just(VerticalConstraint::Top),
        Just(VerticalConstraint::Bottom),
        Just(VerticalConstraint::TopBottom),
        Just(VerticalConstraint::Center),
        Just(VerticalConstraint::Scale),
    ]
}

fn constraint_strategy() -> impl Strategy<Value = Constraint> {
    (horizontal_strategy(), vertical_strategy()).prop_map(|(h, v)| Constraint::new(h, v))
}

fn box_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (0.0f64..500.0, 0.0f64..400.0, 1.0f64..300.0, 1.0f64..200.0)
}

fn pick(ids: &[ElementId], n: usize) -> ElementId {
    ids[n % ids.len()]
}

fn apply(tree: &mut ElementTree, op: &Op) {
    let ids = tree.depth_first(tree.root());
    let name = |n: &Option<u8>| n.map(|n| format!("N{}", n));
    // Invalid operations must fail cleanly; only the invariants matter here.
    let _ = match op {
        Op::AddItem { parent, name: n } => {
            let mut config = ElementConfig::new("rectangle");
            config.name = name(n);
            tree.add_element(pick(&ids, *parent), &config).map(|_| ())
        }
        Op::AddFrame { parent, name: n } => {
            let mut config = ElementConfig::frame();
            config.name = name(n);
            tree.add_element(pick(&ids, *parent), &config).map(|_| ())
        }
        Op::Remove { target } => tree.remove_element(pick(&ids, *target)).map(|_| ()),
        Op::Move { src, dest, index } => tree
            .move_element(pick(&ids, *src), pick(&ids, *dest), *index)
            .map(|_| ()),
        Op::Rename { target, name } => tree
            .rename(pick(&ids, *target), &format!("N{}", name))
            .map(|_| ()),
    };
}

proptest! {
    #[test]
    fn tree_stays_acyclic_with_unique_names(
        ops in proptest::collection::vec(op_strategy(), 1..60)
    ) {
        let mut tree = ElementTree::new();
        for op in &ops {
            apply(&mut tree, op);
            prop_assert!(
                tree.verify_integrity().is_ok(),
                "{:?} after {:?}",
                tree.verify_integrity(),
                op
            );
        }
    }

    #[test]
    fn reparenting_preserves_bounds(
        frame_box in box_strategy(),
        element_box in box_strategy(),
        constraint in constraint_strategy(),
    ) {
        let mut tree = ElementTree::with_root_bounds(Rect::new(0.0, 0.0, 1000.0, 800.0));
        let root = tree.root();
        let (fx, fy, fw, fh) = frame_box;
        let frame = tree
            .add_element(
                root,
                &ElementConfig::frame().with_placement(Placement::at(fx, fy, fw, fh)),
            )
            .unwrap();
        let (ex, ey, ew, eh) = element_box;
        let element = tree
            .add_element(
                root,
                &ElementConfig::new("rectangle")
                    .with_placement(Placement::at(ex, ey, ew, eh)),
            )
            .unwrap();
        tree.set_constraint(element, constraint).unwrap();
        let before = tree.bounds_of(element).unwrap();

        tree.move_element(element, frame, None).unwrap();
        prop_assert!(tree.bounds_of(element).unwrap().approx_eq(&before));

        tree.move_element(element, root, Some(0)).unwrap();
        prop_assert!(tree.bounds_of(element).unwrap().approx_eq(&before));
    }
}
