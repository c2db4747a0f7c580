// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The declarative idle-state menu table.
//!
//! Each entry maps a set of accepted literal tokens to an action: the
//! normalized keyword phrase, the bare index digit, and the `N.`/`N)` forms.
//! Everything is compared against the *normalized* token, never raw text.

/// What an idle-state menu pick starts (or does immediately).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    TrackPeriod,
    LogSymptoms,
    Education,
    OrderPads,
    ViewCycle,
    ViewSymptoms,
    ChangeLanguage,
    GiveFeedback,
}

struct MenuEntry {
    index: u8,
    keyword: &'static str,
    action: MenuAction,
}

/// Menu order matches the rendered menu template.
const MENU: [MenuEntry; 8] = [
    MenuEntry { index: 1, keyword: "trackmyperiod", action: MenuAction::TrackPeriod },
    MenuEntry { index: 2, keyword: "logsymptoms", action: MenuAction::LogSymptoms },
    MenuEntry { index: 3, keyword: "learnaboutsexualhealth", action: MenuAction::Education },
    MenuEntry { index: 4, keyword: "orderlunarapads", action: MenuAction::OrderPads },
    MenuEntry { index: 5, keyword: "viewmycycle", action: MenuAction::ViewCycle },
    MenuEntry { index: 6, keyword: "viewmysymptoms", action: MenuAction::ViewSymptoms },
    MenuEntry { index: 7, keyword: "changelanguage", action: MenuAction::ChangeLanguage },
    MenuEntry { index: 8, keyword: "givefeedback", action: MenuAction::GiveFeedback },
];

impl MenuEntry {
    fn matches(&self, token: &str) -> bool {
        if token == self.keyword {
            return true;
        }
        let n = self.index;
        // Bare digit, "N." and "N)" forms. Normalization strips punctuation,
        // so the latter two also arrive as the bare digit; they are accepted
        // literally as well for callers matching pre-normalized tokens.
        token == n.to_string() || token == format!("{n}.") || token == format!("{n})")
    }
}

/// Match a normalized token against the menu table.
pub fn match_menu(token: &str) -> Option<MenuAction> {
    MENU.iter().find(|e| e.matches(token)).map(|e| e.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn matches_bare_digits() {
        assert_eq!(match_menu("1"), Some(MenuAction::TrackPeriod));
        assert_eq!(match_menu("4"), Some(MenuAction::OrderPads));
        assert_eq!(match_menu("8"), Some(MenuAction::GiveFeedback));
    }

    #[test]
    fn matches_punctuated_index_forms() {
        assert_eq!(match_menu("2."), Some(MenuAction::LogSymptoms));
        assert_eq!(match_menu("7)"), Some(MenuAction::ChangeLanguage));
    }

    #[test]
    fn matches_normalized_keyword_phrases() {
        assert_eq!(
            match_menu(&normalize("Track my period")),
            Some(MenuAction::TrackPeriod)
        );
        assert_eq!(
            match_menu(&normalize("ORDER LUNARA PADS!")),
            Some(MenuAction::OrderPads)
        );
        assert_eq!(
            match_menu(&normalize("view my symptoms")),
            Some(MenuAction::ViewSymptoms)
        );
    }

    #[test]
    fn punctuated_forms_normalize_to_bare_digit() {
        assert_eq!(match_menu(&normalize("3.")), Some(MenuAction::Education));
        assert_eq!(match_menu(&normalize("5)")), Some(MenuAction::ViewCycle));
    }

    #[test]
    fn unknown_tokens_do_not_match() {
        assert_eq!(match_menu(""), None);
        assert_eq!(match_menu("9"), None);
        assert_eq!(match_menu("trackperiod"), None);
        assert_eq!(match_menu("menu"), None);
    }
}
