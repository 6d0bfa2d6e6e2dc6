//! Translator (dub track) selection
//!
//! The translator list on a [`MediaDescriptor`](crate::types::MediaDescriptor)
//! is already in the site's own priority order, so "no preference" means
//! "take the first entry".

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Translator, TranslatorId, TranslatorRef};

/// Outcome of evaluating a preference list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: TranslatorId,
    /// True when none of the preferred translators was available and the
    /// site-priority first entry was used instead
    pub fallback_used: bool,
}

/// Pick a translator id from `translators` for an optional caller request.
///
/// - No request: first entry (site priority order).
/// - `TranslatorRef::Id`: exact id lookup.
/// - `TranslatorRef::Name`: case-insensitive exact name match, first hit.
///
/// Pure lookup; deterministic for any input.
pub fn select(
    translators: &[Translator],
    requested: Option<&TranslatorRef>,
) -> Result<TranslatorId> {
    if translators.is_empty() {
        return Err(Error::NoTranslators);
    }

    let Some(requested) = requested else {
        let best = translators[0].id;
        debug!(translator_id = best, "no translator requested, using site priority");
        return Ok(best);
    };

    match requested {
        TranslatorRef::Id(id) => {
            if translators.iter().any(|t| t.id == *id) {
                Ok(*id)
            } else {
                Err(Error::TranslatorNotFound {
                    requested: id.to_string(),
                    available: translators.iter().map(|t| t.id).collect(),
                })
            }
        }
        TranslatorRef::Name(name) => translators
            .iter()
            .find(|t| equals_ignore_case(&t.name, name))
            .map(|t| t.id)
            .ok_or_else(|| Error::TranslatorNotFound {
                requested: name.clone(),
                available: translators.iter().map(|t| t.id).collect(),
            }),
    }
}

/// Evaluate an ordered preference list, first available wins; fall back to
/// the site-priority first entry when none matches.
pub fn select_preferred(
    translators: &[Translator],
    preferred: &[TranslatorRef],
) -> Result<Selection> {
    for pref in preferred {
        if let Ok(id) = select(translators, Some(pref)) {
            info!(translator_id = id, requested = %pref, "preferred translator available");
            return Ok(Selection {
                id,
                fallback_used: false,
            });
        }
    }

    let id = select(translators, None)?;
    let fallback_used = !preferred.is_empty();
    if fallback_used {
        info!(translator_id = id, "no preferred translator found, falling back");
    }
    Ok(Selection { id, fallback_used })
}

// Translator names are frequently non-ASCII (Cyrillic studio names), where
// eq_ignore_ascii_case is not enough.
fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Translator> {
        vec![
            Translator::new(56, "HDrezka Studio"),
            Translator::new(238, "Оригинал (+субтитры)"),
            Translator::new(111, "Dubbing"),
        ]
    }

    #[test]
    fn absent_request_takes_priority_first() {
        assert_eq!(select(&sample(), None).unwrap(), 56);
    }

    #[test]
    fn empty_list_fails() {
        assert!(matches!(select(&[], None), Err(Error::NoTranslators)));
    }

    #[test]
    fn id_lookup_hits_and_misses() {
        assert_eq!(select(&sample(), Some(&TranslatorRef::Id(238))).unwrap(), 238);

        let err = select(&sample(), Some(&TranslatorRef::Id(999))).unwrap_err();
        match err {
            Error::TranslatorNotFound { requested, available } => {
                assert_eq!(requested, "999");
                assert_eq!(available, vec![56, 238, 111]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let name = TranslatorRef::Name("dubbing".to_string());
        assert_eq!(select(&sample(), Some(&name)).unwrap(), 111);

        let cyrillic = TranslatorRef::Name("оригинал (+субтитры)".to_string());
        assert_eq!(select(&sample(), Some(&cyrillic)).unwrap(), 238);
    }

    #[test]
    fn unknown_name_fails() {
        let name = TranslatorRef::Name("Nope".to_string());
        assert!(matches!(
            select(&sample(), Some(&name)),
            Err(Error::TranslatorNotFound { .. })
        ));
    }

    #[test]
    fn preference_list_first_available_wins() {
        let prefs = vec![
            TranslatorRef::Name("Missing Studio".to_string()),
            TranslatorRef::Id(238),
            TranslatorRef::Id(56),
        ];
        let selection = select_preferred(&sample(), &prefs).unwrap();
        assert_eq!(selection.id, 238);
        assert!(!selection.fallback_used);
    }

    #[test]
    fn exhausted_preferences_fall_back_with_flag() {
        let prefs = vec![TranslatorRef::Id(999)];
        let selection = select_preferred(&sample(), &prefs).unwrap();
        assert_eq!(selection.id, 56);
        assert!(selection.fallback_used);
    }

    #[test]
    fn empty_preferences_do_not_flag_fallback() {
        let selection = select_preferred(&sample(), &[]).unwrap();
        assert_eq!(selection.id, 56);
        assert!(!selection.fallback_used);
    }

    #[test]
    fn preferences_on_empty_list_still_fail() {
        let prefs = vec![TranslatorRef::Id(238)];
        assert!(matches!(
            select_preferred(&[], &prefs),
            Err(Error::NoTranslators)
        ));
    }
}
