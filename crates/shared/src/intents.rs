//! Keyword routing. The route table order is the tie-break: the first route
//! with a trigger contained in the normalized utterance wins, otherwise the
//! utterance falls through to chat.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::models::Intent;

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub intent: Intent,
    pub triggers: &'static [&'static str],
    /// Phrases removed from the utterance to obtain the handler argument.
    pub strip: &'static [&'static str],
}

pub const ROUTE_TABLE: &[Route] = &[
    Route {
        intent: Intent::Exit,
        triggers: &["exit", "quit", "close"],
        strip: &[],
    },
    Route {
        intent: Intent::Time,
        triggers: &["time"],
        strip: &[],
    },
    Route {
        intent: Intent::Date,
        triggers: &["date"],
        strip: &[],
    },
    Route {
        intent: Intent::Screenshot,
        triggers: &["screenshot"],
        strip: &[],
    },
    Route {
        intent: Intent::GenerateImage,
        triggers: &["generate image"],
        strip: &["generate image"],
    },
    Route {
        intent: Intent::GeneratePresentation,
        triggers: &["powerpoint", "presentation"],
        strip: &["create", "powerpoint", "presentation"],
    },
    Route {
        intent: Intent::OcrClick,
        triggers: &["click"],
        strip: &["click"],
    },
    Route {
        intent: Intent::Detect,
        triggers: &["detect", "camera"],
        strip: &[],
    },
    Route {
        intent: Intent::TaskAdd,
        triggers: &["new task"],
        strip: &["new task"],
    },
    Route {
        intent: Intent::TaskShow,
        triggers: &["show work", "show tasks"],
        strip: &[],
    },
    Route {
        intent: Intent::TaskDelete,
        triggers: &["delete task"],
        strip: &["delete task"],
    },
    Route {
        intent: Intent::SendEmail,
        triggers: &["send email", "send gmail"],
        strip: &[],
    },
    Route {
        intent: Intent::Wikipedia,
        triggers: &["wikipedia"],
        strip: &["wikipedia"],
    },
    Route {
        intent: Intent::OpenApp,
        triggers: &["open"],
        strip: &["open"],
    },
];

/// A resolved utterance: the chosen intent and the argument left after the
/// route's strip phrases were removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedUtterance {
    pub intent: Intent,
    pub argument: String,
}

pub fn normalize_utterance(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}

pub fn detect_intent(utterance: &str) -> Intent {
    find_route(&normalize_utterance(utterance))
        .map(|route| route.intent)
        .unwrap_or(Intent::Chat)
}

pub fn route_utterance(utterance: &str) -> RoutedUtterance {
    let normalized = normalize_utterance(utterance);
    match find_route_index(&normalized) {
        Some(index) => RoutedUtterance {
            intent: ROUTE_TABLE[index].intent,
            argument: strip_phrases(utterance, &STRIP_PATTERNS[index]),
        },
        None => RoutedUtterance {
            intent: Intent::Chat,
            argument: utterance.trim().to_string(),
        },
    }
}

/// Case-insensitive matchers for each route's strip phrases, indexed like
/// [`ROUTE_TABLE`].
static STRIP_PATTERNS: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    ROUTE_TABLE
        .iter()
        .map(|route| route.strip.iter().filter_map(|phrase| phrase_pattern(phrase)).collect())
        .collect()
});

fn phrase_pattern(phrase: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(phrase))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Removes every occurrence of each phrase, keeping the casing of whatever
/// text remains.
fn strip_phrases(utterance: &str, patterns: &[Regex]) -> String {
    let mut remaining = utterance.trim().to_string();
    for pattern in patterns {
        remaining = pattern.replace_all(&remaining, "").into_owned();
    }
    remaining.trim().to_string()
}

fn find_route(normalized: &str) -> Option<&'static Route> {
    find_route_index(normalized).map(|index| &ROUTE_TABLE[index])
}

fn find_route_index(normalized: &str) -> Option<usize> {
    ROUTE_TABLE
        .iter()
        .position(|route| contains_any(normalized, route.triggers))
}

fn contains_any(query: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| query.contains(term))
}

#[cfg(test)]
mod tests {
    use super::{ROUTE_TABLE, STRIP_PATTERNS, detect_intent, route_utterance};
    use crate::models::Intent;

    #[test]
    fn route_table_order_is_the_documented_priority() {
        let order = ROUTE_TABLE
            .iter()
            .map(|route| route.intent)
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                Intent::Exit,
                Intent::Time,
                Intent::Date,
                Intent::Screenshot,
                Intent::GenerateImage,
                Intent::GeneratePresentation,
                Intent::OcrClick,
                Intent::Detect,
                Intent::TaskAdd,
                Intent::TaskShow,
                Intent::TaskDelete,
                Intent::SendEmail,
                Intent::Wikipedia,
                Intent::OpenApp,
            ]
        );
    }

    #[test]
    fn detect_intent_classifies_each_route() {
        assert_eq!(detect_intent("Quit"), Intent::Exit);
        assert_eq!(detect_intent("what TIME is it"), Intent::Time);
        assert_eq!(detect_intent("what's the date"), Intent::Date);
        assert_eq!(detect_intent("take a screenshot"), Intent::Screenshot);
        assert_eq!(detect_intent("generate image of a cat"), Intent::GenerateImage);
        assert_eq!(detect_intent("create powerpoint on rust"), Intent::GeneratePresentation);
        assert_eq!(detect_intent("click submit"), Intent::OcrClick);
        assert_eq!(detect_intent("open the camera"), Intent::Detect);
        assert_eq!(detect_intent("new task buy milk"), Intent::TaskAdd);
        assert_eq!(detect_intent("show work"), Intent::TaskShow);
        assert_eq!(detect_intent("show tasks"), Intent::TaskShow);
        assert_eq!(detect_intent("delete task milk"), Intent::TaskDelete);
        assert_eq!(detect_intent("send gmail"), Intent::SendEmail);
        assert_eq!(detect_intent("wikipedia rust language"), Intent::Wikipedia);
        assert_eq!(detect_intent("open firefox"), Intent::OpenApp);
        assert_eq!(detect_intent("tell me a joke"), Intent::Chat);
        assert_eq!(detect_intent(""), Intent::Chat);
    }

    #[test]
    fn earlier_route_wins_when_triggers_overlap() {
        assert_eq!(detect_intent("screenshot then send email"), Intent::Screenshot);
        assert_eq!(detect_intent("send email about the time"), Intent::Time);
        assert_eq!(detect_intent("open a presentation"), Intent::GeneratePresentation);
        assert_eq!(detect_intent("please update me"), Intent::Date);
        assert_eq!(detect_intent("clean the closet"), Intent::Exit);
        assert_eq!(detect_intent("delete task new task"), Intent::TaskAdd);
    }

    #[test]
    fn every_synonym_is_stripped_independently() {
        let routed = route_utterance("Create PowerPoint presentation on Solar Energy");
        assert_eq!(routed.intent, Intent::GeneratePresentation);
        assert_eq!(routed.argument, "on Solar Energy");
    }

    #[test]
    fn argument_keeps_original_casing() {
        let routed = route_utterance("  New Task Call Mom  ");
        assert_eq!(routed.intent, Intent::TaskAdd);
        assert_eq!(routed.argument, "Call Mom");
    }

    #[test]
    fn argument_is_empty_when_only_trigger_is_present() {
        assert_eq!(route_utterance("generate image").argument, "");
        assert_eq!(route_utterance("Wikipedia   ").argument, "");
    }

    #[test]
    fn stripping_is_substring_removal_not_tokenizing() {
        assert_eq!(route_utterance("open opener").argument, "er");
    }

    #[test]
    fn every_strip_phrase_has_a_compiled_pattern() {
        for (route, patterns) in ROUTE_TABLE.iter().zip(STRIP_PATTERNS.iter()) {
            assert_eq!(route.strip.len(), patterns.len(), "{}", route.intent);
        }
    }

    #[test]
    fn chat_keeps_the_untouched_utterance() {
        let routed = route_utterance("  How Are You?  ");
        assert_eq!(routed.intent, Intent::Chat);
        assert_eq!(routed.argument, "How Are You?");
    }
}
