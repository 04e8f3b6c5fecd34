use crate::action::{TreeAction, TreeEvent};
use crate::ast::AstNode;
use crate::config::ExplorerConfig;
use crate::error::{ParseError, ParseFailure};
use crate::flatten::{FlatTree, flatten};
use crate::id::NodeId;
use crate::locate::find_node_id_at_offset;
use crate::model::TextRange;
use crate::navigate;
use crate::position::{LineIndex, Position};
use crate::visibility::{ExpansionSet, VisibleRow, visible_node_ids, visible_rows};

#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

/// Explorer state: source text, current tree, selection, expansion and highlight.
///
/// Every derived value (visible rows, resolved node, highlight) is recomputed in
/// full from the pure functions of this crate when its inputs change.
pub struct ExplorerState {
    config: ExplorerConfig,
    source: String,
    line_index: LineIndex,
    tree: Option<AstNode>,
    parse_error: Option<ParseError>,
    selected: Option<NodeId>,
    expanded: ExpansionSet,
    highlight: Option<TextRange>,
    // Cached visible ids; rebuilt from scratch whenever `dirty` is set.
    visible: Vec<NodeId>,
    dirty: bool,
    #[cfg(feature = "keymap")]
    keymap: TreeKeyBindings,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(ExplorerConfig::default())
    }
}

impl ExplorerState {
    /// Creates an empty state: no text, no tree, nothing selected.
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            source: String::new(),
            line_index: LineIndex::default(),
            tree: None,
            parse_error: None,
            selected: None,
            expanded: ExpansionSet::new(),
            highlight: None,
            visible: Vec::new(),
            dirty: true,
            #[cfg(feature = "keymap")]
            keymap: TreeKeyBindings::new(),
        }
    }

    pub const fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut TreeKeyBindings {
        &mut self.keymap
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Current tree, or `None` while the source does not parse.
    pub const fn tree(&self) -> Option<&AstNode> {
        self.tree.as_ref()
    }

    /// Error of the last parse, if it failed.
    pub const fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    pub const fn selected_id(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Node behind the selected id.
    pub fn selected_node(&self) -> Option<&AstNode> {
        self.selected.as_ref().and_then(|id| self.node(id))
    }

    /// Source range to highlight for the selected node.
    pub const fn highlight(&self) -> Option<TextRange> {
        self.highlight
    }

    pub const fn expanded(&self) -> &ExpansionSet {
        &self.expanded
    }

    /// Mutable access to the expansion set; the visible rows are rebuilt afterwards.
    pub const fn expanded_mut(&mut self) -> &mut ExpansionSet {
        self.dirty = true;
        &mut self.expanded
    }

    /// Resolves an id against the current tree.
    pub fn node(&self, id: &NodeId) -> Option<&AstNode> {
        self.tree.as_ref().and_then(|tree| tree.node_at(id))
    }

    /// Replaces the source text and rebuilds the line table.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.line_index = LineIndex::new(&self.source);
        log::debug!(
            "source replaced: {} bytes, {} lines",
            self.source.len(),
            self.line_index.line_count()
        );
    }

    /// Installs the outcome of a parse, replacing the previous tree wholesale.
    ///
    /// On success, expanded and selected ids that do not name a node of the new
    /// tree are dropped; when nothing stays expanded the configured initial depth
    /// is applied. On failure the tree is cleared and the error kept for display.
    pub fn apply_parse(&mut self, result: Result<AstNode, ParseFailure>) {
        self.dirty = true;
        match result {
            Ok(tree) => {
                self.parse_error = None;
                self.tree = Some(tree);
                let flat = FlatTree::new(self.tree.as_ref());

                let pruned = self.expanded.retain_existing(&flat);
                if self.expanded.is_empty() {
                    self.expanded
                        .expand_to_depth(&flat, self.config.initial_expand_depth);
                }
                if self.selected.as_ref().is_some_and(|id| !flat.contains(id)) {
                    self.selected = None;
                }
                self.highlight = self
                    .selected
                    .as_ref()
                    .and_then(|id| flat.get(id))
                    .map(|entry| entry.node.range);
                log::debug!(
                    "tree replaced: {} nodes, {} stale expanded ids dropped",
                    flat.len(),
                    pruned
                );
            }
            Err(failure) => {
                log::debug!("parse failed: {failure}");
                self.parse_error = Some(match failure {
                    ParseFailure::Parser(error) => error,
                    other => ParseError::from_message(other.to_string()),
                });
                self.tree = None;
                self.selected = None;
                self.highlight = None;
            }
        }
    }

    #[cfg(feature = "json")]
    /// Decodes a parser reply and installs it.
    pub fn apply_reply(&mut self, json: &str) {
        let result = crate::payload::decode_reply(json, &self.config);
        self.apply_parse(result);
    }

    /// Line/column of a text offset.
    pub fn position_of(&self, offset: usize) -> Position {
        self.line_index.offset_to_position(offset)
    }

    /// Offset of a 1-based line/column, `None` for an unknown line.
    pub fn offset_of(&self, line: usize, column: usize) -> Option<usize> {
        self.line_index.position_to_offset(line, column)
    }

    /// Selects the innermost node under the text cursor.
    ///
    /// With `follow_cursor` the node's ancestors are expanded so its row is
    /// visible. An offset outside every node clears the selection.
    pub fn cursor_moved(&mut self, offset: usize) -> Option<NodeId> {
        let Some(id) = find_node_id_at_offset(self.tree.as_ref(), offset) else {
            self.clear_selection();
            return None;
        };
        log::debug!("cursor at {offset} resolves to node {id}");
        if self.config.follow_cursor {
            self.expanded.expand_to(&id);
            self.dirty = true;
        }
        self.select(id.clone());
        Some(id)
    }

    /// Selects a node of the current tree and highlights its range.
    ///
    /// Returns `false` (and leaves the selection alone) for an unknown id.
    pub fn select(&mut self, id: NodeId) -> bool {
        let Some(range) = self.node(&id).map(|node| node.range) else {
            return false;
        };
        // A hidden row is clamped to a visible ancestor on the next rebuild.
        if !self.dirty && !self.visible.contains(&id) {
            self.dirty = true;
        }
        self.selected = Some(id);
        self.highlight = Some(range);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.highlight = None;
    }

    /// Toggles expansion state for the given node.
    pub fn toggle(&mut self, id: &NodeId) {
        self.expanded.toggle(id);
        self.dirty = true;
    }

    /// Sets expansion state for the given node.
    pub fn set_expanded(&mut self, id: &NodeId, expand: bool) {
        self.expanded.set_expanded(id, expand);
        self.dirty = true;
    }

    /// Expands all nodes of the current tree.
    pub fn expand_all(&mut self) {
        let flat = FlatTree::new(self.tree.as_ref());
        self.expanded.expand_all(&flat);
        self.dirty = true;
    }

    /// Collapses all nodes.
    pub fn collapse_all(&mut self) {
        self.expanded.collapse_all();
        self.dirty = true;
    }

    /// Ids of the visible rows, rebuilt if the tree or the expansion changed.
    pub fn visible_ids(&mut self) -> &[NodeId] {
        self.ensure_visible();
        &self.visible
    }

    /// Visible rows with level and expansion metadata.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let entries = flatten(self.tree.as_ref());
        visible_rows(&entries, &self.expanded)
    }

    /// Ensures the visible id list is up to date (if marked dirty).
    pub fn ensure_visible(&mut self) {
        if !self.dirty {
            return;
        }
        let entries = flatten(self.tree.as_ref());
        self.visible = visible_node_ids(&entries, &self.expanded);
        self.dirty = false;
        self.clamp_selection();
    }

    /// Handles a tree action and returns the resulting event.
    pub fn handle_action<C>(&mut self, action: TreeAction<C>) -> TreeEvent<C> {
        if matches!(&action, TreeAction::Custom(_)) {
            return TreeEvent::Action(action);
        }

        self.ensure_visible();
        if self.visible.is_empty() {
            return TreeEvent::Unhandled;
        }

        let handled = match action {
            TreeAction::SelectPrev => self.step(navigate::previous),
            TreeAction::SelectNext => self.step(navigate::next),
            TreeAction::SelectFirst => self.select_visible(navigate::first(&self.visible).cloned()),
            TreeAction::SelectLast => self.select_visible(navigate::last(&self.visible).cloned()),
            TreeAction::SelectParent => {
                let parent = self.selected.as_ref().and_then(navigate::parent_of);
                self.select_visible(parent)
            }
            TreeAction::SelectChild => self.select_child(),
            TreeAction::ToggleNode => self.toggle_selected(false),
            TreeAction::ToggleRecursive => self.toggle_selected(true),
            TreeAction::ExpandAll => {
                self.expand_all();
                true
            }
            TreeAction::CollapseAll => {
                self.collapse_all();
                true
            }
            TreeAction::Custom(_) => return TreeEvent::Action(action),
        };

        if handled {
            TreeEvent::Handled
        } else {
            TreeEvent::Unhandled
        }
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event into an action and handles it.
    pub fn handle_key(&mut self, key: KeyEvent) -> TreeEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event with a custom mapping and handles it.
    pub fn handle_key_with<C, F>(&mut self, key: KeyEvent, custom: F) -> TreeEvent<C>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(action)
    }

    // Moves along the visible list; with nothing selected, starts at the first row.
    fn step<F>(&mut self, direction: F) -> bool
    where
        F: for<'v> Fn(&NodeId, &'v [NodeId]) -> Option<&'v NodeId>,
    {
        let target = match &self.selected {
            Some(current) => direction(current, &self.visible).cloned(),
            None => navigate::first(&self.visible).cloned(),
        };
        self.select_visible(target)
    }

    fn select_visible(&mut self, target: Option<NodeId>) -> bool {
        target.is_some_and(|id| self.select(id))
    }

    fn select_child(&mut self) -> bool {
        let Some(current) = self.selected.clone() else {
            return false;
        };
        let target = {
            let flat = FlatTree::new(self.tree.as_ref());
            let Some(entry) = flat.get(&current) else {
                return false;
            };
            if !entry.has_children() {
                return false;
            }
            if self.expanded.expand(current.clone()) {
                self.dirty = true;
            }
            navigate::first_child_of(&current, &flat, &self.expanded).cloned()
        };
        self.select_visible(target)
    }

    fn toggle_selected(&mut self, recursive: bool) -> bool {
        let Some(current) = self.selected.clone() else {
            return false;
        };
        let flat = FlatTree::new(self.tree.as_ref());
        if !flat.get(&current).is_some_and(|entry| entry.has_children()) {
            return false;
        }
        if !recursive {
            self.expanded.toggle(&current);
        } else if self.expanded.contains(&current) {
            self.expanded.collapse_subtree(&current, &flat);
        } else {
            self.expanded.expand_subtree(&current, &flat);
        }
        self.dirty = true;
        true
    }

    // A selection hidden by a collapse moves up to its nearest visible ancestor.
    fn clamp_selection(&mut self) {
        let Some(selected) = &self.selected else {
            return;
        };
        if self.visible.contains(selected) {
            return;
        }
        let fallback = selected
            .ancestors()
            .into_iter()
            .rev()
            .find(|id| self.visible.contains(id));
        match fallback {
            Some(id) => {
                self.select(id);
            }
            None => self.clear_selection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package main\n\nfunc main() {\n\tprintln(1)\n}";

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    // File{Ident, FuncDecl{Ident, BlockStmt{ExprStmt}}}
    fn go_tree() -> AstNode {
        let len = SOURCE.len();
        AstNode::new("File", 0, len).with_children(vec![
            AstNode::new("Ident", 8, 12).with_metadata("name", "main"),
            AstNode::new("FuncDecl", 14, len).with_children(vec![
                AstNode::new("Ident", 19, 23).with_metadata("name", "main"),
                AstNode::new("BlockStmt", 26, len)
                    .with_children(vec![AstNode::new("ExprStmt", 29, 39)]),
            ]),
        ])
    }

    fn loaded() -> ExplorerState {
        let mut state = ExplorerState::default();
        state.set_source(SOURCE);
        state.apply_parse(Ok(go_tree()));
        state
    }

    fn visible(state: &mut ExplorerState) -> Vec<String> {
        state.visible_ids().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn fresh_parse_expands_the_root() {
        let mut state = loaded();
        assert_eq!(visible(&mut state), vec!["0", "0-0", "0-1"]);
        assert!(state.parse_error().is_none());
    }

    #[test]
    fn cursor_selects_innermost_node_and_reveals_it() {
        let mut state = loaded();
        let selected = state.cursor_moved(30);
        assert_eq!(selected, Some(id("0-1-1-0")));
        assert_eq!(state.selected_node().map(|n| n.kind.as_str()), Some("ExprStmt"));
        assert_eq!(state.highlight(), Some(TextRange::new(29, 39)));
        assert_eq!(
            visible(&mut state),
            vec!["0", "0-0", "0-1", "0-1-0", "0-1-1", "0-1-1-0"]
        );
    }

    #[test]
    fn cursor_in_gap_selects_enclosing_node() {
        let mut state = loaded();
        assert_eq!(state.cursor_moved(13), Some(id("0")));
        assert_eq!(state.cursor_moved(500), None);
        assert!(state.selected_id().is_none());
        assert!(state.highlight().is_none());
    }

    #[test]
    fn cursor_does_not_expand_when_not_following() {
        let mut state = ExplorerState::new(ExplorerConfig::new().with_follow_cursor(false));
        state.apply_parse(Ok(go_tree()));
        state.cursor_moved(30);
        assert_eq!(visible(&mut state), vec!["0", "0-0", "0-1"]);
        // The selection is hidden, so it climbs to the nearest visible ancestor.
        assert_eq!(state.selected_id(), Some(&id("0-1")));
    }

    #[test]
    fn hidden_cursor_selection_keeps_keyboard_walk_alive() {
        let mut state = ExplorerState::new(ExplorerConfig::new().with_follow_cursor(false));
        state.set_source(SOURCE);
        state.apply_parse(Ok(go_tree()));
        assert_eq!(visible(&mut state), vec!["0", "0-0", "0-1"]);

        state.cursor_moved(30);
        assert_eq!(state.handle_action::<()>(TreeAction::SelectPrev), TreeEvent::Handled);
        assert_eq!(state.selected_id(), Some(&id("0-0")));
        assert_eq!(state.handle_action::<()>(TreeAction::SelectNext), TreeEvent::Handled);
        assert_eq!(state.selected_id(), Some(&id("0-1")));
    }

    #[test]
    fn positions_come_from_the_line_index() {
        let state = loaded();
        let pos = state.position_of(10);
        assert_eq!((pos.line, pos.column), (1, 11));
        assert_eq!(state.offset_of(3, 1), Some(14));
        assert_eq!(state.offset_of(9, 1), None);
    }

    #[test]
    fn keyboard_walk_over_visible_rows() {
        let mut state = loaded();
        assert_eq!(state.handle_action::<()>(TreeAction::SelectNext), TreeEvent::Handled);
        assert_eq!(state.selected_id(), Some(&id("0")));
        state.handle_action::<()>(TreeAction::SelectLast);
        assert_eq!(state.selected_id(), Some(&id("0-1")));
        assert_eq!(state.handle_action::<()>(TreeAction::SelectNext), TreeEvent::Unhandled);
        state.handle_action::<()>(TreeAction::SelectPrev);
        assert_eq!(state.selected_id(), Some(&id("0-0")));
        state.handle_action::<()>(TreeAction::SelectParent);
        assert_eq!(state.selected_id(), Some(&id("0")));
        assert_eq!(state.handle_action::<()>(TreeAction::SelectParent), TreeEvent::Unhandled);
    }

    #[test]
    fn select_child_expands_collapsed_parent() {
        let mut state = loaded();
        state.select(id("0-1"));
        assert_eq!(state.handle_action::<()>(TreeAction::SelectChild), TreeEvent::Handled);
        assert_eq!(state.selected_id(), Some(&id("0-1-0")));
        assert!(state.expanded().contains(&id("0-1")));
        // Leaves have no child to move to.
        assert_eq!(state.handle_action::<()>(TreeAction::SelectChild), TreeEvent::Unhandled);
    }

    #[test]
    fn toggle_recursive_expands_and_collapses_subtree() {
        let mut state = loaded();
        state.select(id("0-1"));
        state.handle_action::<()>(TreeAction::ToggleRecursive);
        assert_eq!(visible(&mut state).len(), 6);
        state.handle_action::<()>(TreeAction::ToggleRecursive);
        assert_eq!(visible(&mut state), vec!["0", "0-0", "0-1"]);
        assert!(!state.expanded().contains(&id("0-1-1")));
    }

    #[test]
    fn collapse_all_moves_hidden_selection_up() {
        let mut state = loaded();
        state.cursor_moved(30);
        state.handle_action::<()>(TreeAction::CollapseAll);
        assert_eq!(visible(&mut state), vec!["0"]);
        assert_eq!(state.selected_id(), Some(&id("0")));
        assert_eq!(state.highlight(), Some(TextRange::new(0, SOURCE.len())));
    }

    #[test]
    fn custom_actions_are_forwarded() {
        let mut state = ExplorerState::default();
        assert_eq!(
            state.handle_action(TreeAction::Custom(7)),
            TreeEvent::Action(TreeAction::Custom(7))
        );
        assert_eq!(state.handle_action::<()>(TreeAction::SelectNext), TreeEvent::Unhandled);
    }

    #[test]
    fn failed_parse_clears_tree_but_keeps_expansion() {
        let mut state = loaded();
        state.cursor_moved(30);
        state.apply_parse(Err(ParseFailure::Parser(ParseError::from_message(
            "input.go:4:2: expected '}'",
        ))));
        assert!(state.tree().is_none());
        assert!(state.selected_id().is_none());
        assert_eq!(state.parse_error().map(|e| e.line), Some(4));
        assert!(visible(&mut state).is_empty());
        assert!(state.expanded().contains(&id("0-1-1")));

        state.apply_parse(Err(ParseFailure::MissingTree));
        assert_eq!(state.parse_error().map(|e| e.message.as_str()), Some("no AST returned"));
    }

    #[test]
    fn reparse_prunes_ids_missing_from_new_tree() {
        let mut state = loaded();
        state.cursor_moved(30);
        let smaller = AstNode::new("File", 0, 12).with_children(vec![AstNode::new("Ident", 8, 12)]);
        state.apply_parse(Ok(smaller));
        assert!(state.selected_id().is_none());
        assert!(state.highlight().is_none());
        // Only the root is still expandable in the new tree.
        assert_eq!(state.expanded().len(), 1);
        assert_eq!(visible(&mut state), vec!["0", "0-0"]);
    }

    #[test]
    fn reparse_keeps_surviving_selection() {
        let mut state = loaded();
        state.cursor_moved(10);
        state.apply_parse(Ok(go_tree()));
        assert_eq!(state.selected_id(), Some(&id("0-0")));
        assert_eq!(state.highlight(), Some(TextRange::new(8, 12)));
    }

    #[cfg(feature = "json")]
    #[test]
    fn applies_parser_reply() {
        let mut state = ExplorerState::default();
        state.apply_reply(
            r#"{"ast": "{\"type\":\"File\",\"pos\":1,\"end\":13,\"children\":[{\"type\":\"Ident\",\"pos\":9,\"end\":13}]}"}"#,
        );
        assert_eq!(state.cursor_moved(10), Some(id("0-0")));
        state.apply_reply(r#"{"error": "input.go:1:1: expected 'package', found 'EOF'"}"#);
        assert!(state.tree().is_none());
        assert_eq!(state.parse_error().map(|e| e.column), Some(1));
    }
}
