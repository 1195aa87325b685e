//! Property tests for board drag-and-drop.

use proptest::prelude::*;

use stagehand::board::{move_column, transfer_card, Card, Column, DropTarget};

fn board(sizes: &[usize]) -> Vec<Column<()>> {
    sizes
        .iter()
        .enumerate()
        .map(|(c, size)| Column {
            column_id: format!("col-{}", c),
            title: format!("Column {}", c),
            items: (0..*size)
                .map(|i| Card {
                    id: format!("card-{}-{}", c, i),
                    content: (),
                })
                .collect(),
        })
        .collect()
}

fn card_ids(columns: &[Column<()>]) -> Vec<String> {
    let mut ids: Vec<_> = columns
        .iter()
        .flat_map(|c| c.items.iter().map(|card| card.id.clone()))
        .collect();
    ids.sort();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a card transfer never loses or duplicates a card.
    #[test]
    fn property_transfer_card_keeps_cards(
        sizes in proptest::collection::vec(1usize..=4, 1..=4),
        source in 0usize..4,
        card in 0usize..4,
        target in 0usize..4,
        before in proptest::option::of(0usize..4),
    ) {
        let columns = board(&sizes);
        let source = source % sizes.len();
        let target = target % sizes.len();
        let card_id = format!("card-{}-{}", source, card % sizes[source]);
        let drop = match before {
            Some(i) if i < sizes[target] => DropTarget::Before(format!("card-{}-{}", target, i)),
            _ => DropTarget::End,
        };

        let result = transfer_card(
            &columns,
            &card_id,
            &format!("col-{}", source),
            &format!("col-{}", target),
            &drop,
        )
        .unwrap();

        if let Some(moved) = result {
            prop_assert_eq!(card_ids(&moved), card_ids(&columns));
            let holder = moved
                .iter()
                .find(|c| c.items.iter().any(|card| card.id == card_id))
                .map(|c| c.column_id.clone());
            prop_assert_eq!(holder, Some(format!("col-{}", target)));
        }
    }

    /// PROPERTY: moving a column keeps every column exactly once.
    #[test]
    fn property_move_column_is_permutation(
        count in 1usize..=5,
        column in 0usize..5,
        before in proptest::option::of(0usize..5),
    ) {
        let columns = board(&vec![1; count]);
        let column_id = format!("col-{}", column % count);
        let drop = match before {
            Some(i) => DropTarget::Before(format!("col-{}", i % count)),
            None => DropTarget::End,
        };

        if let Some(moved) = move_column(&columns, &column_id, &drop).unwrap() {
            let mut ids: Vec<_> = moved.iter().map(|c| c.column_id.clone()).collect();
            ids.sort();
            let mut expected: Vec<_> = columns.iter().map(|c| c.column_id.clone()).collect();
            expected.sort();
            prop_assert_eq!(ids, expected);
        }
    }
}
