// Walkthrough: decode a parser reply, follow the cursor, walk the tree rows.
use astview::{ExplorerState, TreeAction};

const SOURCE: &str = "package main\n\nfunc main() {\n\tprintln(1)\n}";

// What the Go parser returns for SOURCE (positions are 1-based).
const REPLY: &str = r#"{"ast": "{\"type\":\"File\",\"pos\":1,\"end\":42,\"children\":[{\"type\":\"Ident\",\"pos\":9,\"end\":13,\"metadata\":{\"name\":\"main\"},\"fieldName\":\"Name\"},{\"type\":\"FuncDecl\",\"pos\":15,\"end\":42,\"metadata\":{\"name\":\"main\"},\"fieldName\":\"Decls\",\"children\":[{\"type\":\"Ident\",\"pos\":20,\"end\":24,\"metadata\":{\"name\":\"main\"},\"fieldName\":\"Name\"},{\"type\":\"BlockStmt\",\"pos\":27,\"end\":42,\"fieldName\":\"Body\"}]}]}"}"#;

fn print_rows(state: &ExplorerState) {
    for row in state.visible_rows() {
        let marker = match (row.has_children, row.is_expanded) {
            (false, _) => ' ',
            (true, true) => '-',
            (true, false) => '+',
        };
        let label = state.node(&row.id).map_or_else(|| String::from("?"), astview::AstNode::label);
        let indent = "  ".repeat(usize::from(row.level));
        println!("{indent}{marker} {label} [{}]", row.id);
    }
}

fn main() {
    let mut state = ExplorerState::default();
    state.set_source(SOURCE);
    state.apply_reply(REPLY);

    println!("after parse:");
    print_rows(&state);

    // Clicking "main" in `func main()` selects the identifier and reveals its row.
    let offset = state.offset_of(3, 7).unwrap_or_default();
    if let Some(id) = state.cursor_moved(offset) {
        let pos = state.position_of(offset);
        println!("\ncursor {}:{} -> node {id}", pos.line, pos.column);
    }
    if let Some(range) = state.highlight() {
        println!("highlight: {:?}", &SOURCE[range.start..range.end]);
    }
    print_rows(&state);

    state.handle_action::<()>(TreeAction::SelectNext);
    println!("\nnext row: {:?}", state.selected_id().map(ToString::to_string));

    state.apply_reply(r#"{"error": "input.go:4:2: expected '}', found 'EOF'"}"#);
    if let Some(error) = state.parse_error() {
        println!("\nparse error at {}:{}: {error}", error.line, error.column);
    }
}
