// Key handling: feed crossterm key events into the explorer state.
use astview::{AstNode, ExplorerState, KeymapProfile, TreeEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn main() {
    let tree = AstNode::new("File", 0, 30).with_children(vec![
        AstNode::new("A", 0, 5),
        AstNode::new("B", 6, 30).with_children(vec![AstNode::new("C", 6, 10), AstNode::new("D", 11, 30)]),
    ]);

    let mut state = ExplorerState::default();
    state.keymap_mut().set_profile(KeymapProfile::Vim);
    state.apply_parse(Ok(tree));

    for code in [KeyCode::Char('j'), KeyCode::Char('G'), KeyCode::Char('l'), KeyCode::Char('j')] {
        let event = state.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        let selected = state.selected_id().map(ToString::to_string);
        let handled = matches!(event, TreeEvent::Handled);
        println!("{code:?}: handled={handled} selected={selected:?}");
    }
    println!("visible: {:?}", state.visible_ids());
}
