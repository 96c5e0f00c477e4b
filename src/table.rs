use std::collections::BTreeSet;

use tracing::trace;

// One artwork as displayed in the table. Rows are replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u64,
    pub title: String,
    pub place_of_origin: String,
    pub artist_display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnId {
    Id,
    Name,
    Country,
    Company,
}

impl ColumnId {
    pub const ALL: [ColumnId; 4] = [
        ColumnId::Id,
        ColumnId::Name,
        ColumnId::Country,
        ColumnId::Company,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            ColumnId::Id => "ID",
            ColumnId::Name => "Name",
            ColumnId::Country => "Country",
            ColumnId::Company => "Company",
        }
    }

    pub fn cell(&self, row: &Row) -> String {
        match self {
            ColumnId::Id => row.id.to_string(),
            ColumnId::Name => row.title.clone(),
            ColumnId::Country => row.place_of_origin.clone(),
            ColumnId::Company => row.artist_display.clone(),
        }
    }

    pub fn from_index(idx: usize) -> Option<ColumnId> {
        ColumnId::ALL.get(idx).copied()
    }

    fn slot(&self) -> usize {
        match self {
            ColumnId::Id => 0,
            ColumnId::Name => 1,
            ColumnId::Country => 2,
            ColumnId::Company => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    shown: [bool; 4],
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self { shown: [true; 4] }
    }
}

impl ColumnVisibility {
    pub fn is_visible(&self, column: ColumnId) -> bool {
        self.shown[column.slot()]
    }

    // Flips a single flag. Hiding every column is allowed.
    pub fn toggle(&mut self, column: ColumnId) {
        let slot = column.slot();
        self.shown[slot] = !self.shown[slot];
        trace!("Column {:?} visible: {}", column, self.shown[slot]);
    }

    pub fn visible_columns(&self) -> Vec<ColumnId> {
        ColumnId::ALL
            .iter()
            .copied()
            .filter(|c| self.is_visible(*c))
            .collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<u64>,
}

impl SelectionSet {
    pub fn toggle(&mut self, id: u64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn all_selected(&self, rows: &[Row]) -> bool {
        !rows.is_empty() && rows.iter().all(|r| self.ids.contains(&r.id))
    }

    // Header checkbox: clears when every row is already selected, selects all otherwise.
    pub fn toggle_all(&mut self, rows: &[Row]) {
        if self.all_selected(rows) {
            self.clear();
        } else {
            self.ids.extend(rows.iter().map(|r| r.id));
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    // Selected rows in display order
    pub fn selected_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter().filter(|r| self.ids.contains(&r.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64) -> Row {
        Row {
            id,
            title: format!("t{id}"),
            place_of_origin: "Unknown".into(),
            artist_display: "Unknown".into(),
        }
    }

    #[test]
    fn toggling_twice_restores_visibility() {
        let mut vis = ColumnVisibility::default();
        for col in ColumnId::ALL {
            vis.toggle(col);
            assert!(!vis.is_visible(col));
            vis.toggle(col);
            assert!(vis.is_visible(col));
        }
        assert_eq!(vis, ColumnVisibility::default());
    }

    #[test]
    fn toggle_only_touches_one_column() {
        let mut vis = ColumnVisibility::default();
        vis.toggle(ColumnId::Country);
        assert_eq!(
            vis.visible_columns(),
            vec![ColumnId::Id, ColumnId::Name, ColumnId::Company]
        );
    }

    #[test]
    fn all_columns_can_be_hidden() {
        let mut vis = ColumnVisibility::default();
        for col in ColumnId::ALL {
            vis.toggle(col);
        }
        assert!(vis.visible_columns().is_empty());
    }

    #[test]
    fn cells_follow_column_binding() {
        let r = Row {
            id: 7,
            title: "Nighthawks".into(),
            place_of_origin: "United States".into(),
            artist_display: "Edward Hopper".into(),
        };
        let cells: Vec<String> = ColumnId::ALL.iter().map(|c| c.cell(&r)).collect();
        assert_eq!(cells, vec!["7", "Nighthawks", "United States", "Edward Hopper"]);
    }

    #[test]
    fn selection_toggle_and_order() {
        let rows = vec![row(3), row(1), row(2)];
        let mut sel = SelectionSet::default();
        sel.toggle(2);
        sel.toggle(3);
        sel.toggle(1);
        sel.toggle(1);
        let ids: Vec<u64> = sel.selected_rows(&rows).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn toggle_all_selects_then_clears() {
        let rows = vec![row(1), row(2)];
        let mut sel = SelectionSet::default();
        sel.toggle(1);
        sel.toggle_all(&rows);
        assert!(sel.all_selected(&rows));
        sel.toggle_all(&rows);
        assert!(sel.is_empty());
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let sel = SelectionSet::default();
        assert!(!sel.all_selected(&[]));
    }
}
