use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::TreeAction;

/// Key layout used to resolve navigation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Arrows and `hjkl` both navigate.
    #[default]
    Default,
    /// `hjkl` plus `g`/`G`; arrow keys (shifted or not) are left to the host.
    Vim,
    /// Arrows only; every character key (letters, space, `+`, `*`, `-`) is left
    /// to the host so the tree can share focus with an editor.
    Arrows,
}

impl KeymapProfile {
    /// Next profile in `Default -> Vim -> Arrows` order.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Default => Self::Vim,
            Self::Vim => Self::Arrows,
            Self::Arrows => Self::Default,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Vim => "vim",
            Self::Arrows => "arrows",
        }
    }

    const fn takes_chars(self) -> bool {
        !matches!(self, Self::Arrows)
    }

    const fn takes_arrows(self) -> bool {
        !matches!(self, Self::Vim)
    }
}

/// Maps terminal key events to [`TreeAction`]s.
///
/// Keys held with Ctrl or Alt are never claimed, so editor shortcuts pass through.
/// `Enter`, `Home`, `End`, `PageUp` and `PageDown` work in every profile.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self::with_profile(KeymapProfile::Default)
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        let profile = self.profile;

        let action = match key.code {
            KeyCode::Up if profile.takes_arrows() => TreeAction::SelectPrev,
            KeyCode::Down if profile.takes_arrows() => TreeAction::SelectNext,
            KeyCode::Right if shifted && profile.takes_arrows() => TreeAction::ToggleRecursive,
            KeyCode::Left if shifted && profile.takes_arrows() => TreeAction::CollapseAll,
            KeyCode::Right if profile.takes_arrows() => TreeAction::SelectChild,
            KeyCode::Left if profile.takes_arrows() => TreeAction::SelectParent,
            KeyCode::Char('k') if profile.takes_chars() => TreeAction::SelectPrev,
            KeyCode::Char('j') if profile.takes_chars() => TreeAction::SelectNext,
            KeyCode::Char('h') if profile.takes_chars() => TreeAction::SelectParent,
            KeyCode::Char('l') if profile.takes_chars() => TreeAction::SelectChild,
            KeyCode::Char('g') if profile == KeymapProfile::Vim => TreeAction::SelectFirst,
            KeyCode::Char('G') if profile == KeymapProfile::Vim => TreeAction::SelectLast,
            KeyCode::Home | KeyCode::PageUp => TreeAction::SelectFirst,
            KeyCode::End | KeyCode::PageDown => TreeAction::SelectLast,
            KeyCode::Enter => TreeAction::ToggleNode,
            KeyCode::Char(' ') if profile.takes_chars() => TreeAction::ToggleRecursive,
            KeyCode::Char('+' | '*') if profile.takes_chars() => TreeAction::ExpandAll,
            KeyCode::Char('-') if profile.takes_chars() => TreeAction::CollapseAll,
            _ => return None,
        };
        Some(action)
    }

    /// Tries `custom` first and falls back to the built-in layout.
    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<TreeAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        custom(key)
            .map(TreeAction::Custom)
            .or_else(|| self.resolve(key))
    }
}
