use crate::corpus::topic_vocabulary::TopicVocabulary;
use crate::error::SelectionError;

use super::ranking::TopicRanking;
use super::selection_context::SelectionContext;
use super::time_range::TimeRange;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Wire value of the topic field that lifts the topic constraint
pub const UNCONSTRAINED_TOPIC: i64 = -1;

/// Which documents in the date span may be returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFilter {
    /// Every document in the span
    Any,
    /// Only documents whose rank-1 topic is this vocabulary index
    Dominant(usize),
}

impl TopicFilter {
    /// `-1` lifts the constraint, any other value must index the vocabulary
    pub fn from_index(index: i64, vocabulary: &TopicVocabulary) -> Result<Self, SelectionError> {
        if index == UNCONSTRAINED_TOPIC {
            return Ok(Self::Any);
        }
        usize::try_from(index)
            .ok()
            .filter(|&topic| topic < vocabulary.len())
            .map(Self::Dominant)
            .ok_or_else(|| SelectionError::InvalidTopicIndex {
                value: index.to_string(),
                topics: vocabulary.len(),
            })
    }
}

/// The chosen document and its top topic names, heaviest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Position in the corpus
    pub position: usize,
    pub id: usize,
    pub title: String,
    pub text: String,
    pub top3: Vec<String>,
}

/// Pick one document published within `range` that passes `filter`
///
/// The date span is located by boundary search, so the corpus must be sorted,
/// which [`SelectionContext`] guarantees. The pick is uniform over the
/// qualifying documents. With [`TopicFilter::Dominant`] a document qualifies
/// only when the topic is its rank-1 topic; appearing lower in its top three
/// is not enough.
#[instrument(level = "trace", skip(context, rng))]
pub fn select<R: Rng + ?Sized>(
    context: &SelectionContext,
    range: TimeRange,
    filter: TopicFilter,
    rng: &mut R,
) -> Result<Selection, SelectionError> {
    let span = context.corpus().span(range.start, range.end);
    if span.is_empty() {
        debug!(?range, "No documents in the date span");
        return Err(SelectionError::NoMatchingDocuments);
    }

    let (position, ranking) = match filter {
        TopicFilter::Any => {
            let position = rng.random_range(span);
            (position, context.ranking(position))
        }
        TopicFilter::Dominant(topic) => {
            let mut candidates: Vec<(usize, TopicRanking)> = span
                .map(|position| (position, context.ranking(position)))
                .filter(|(_, ranking)| ranking.dominant() == Some(topic))
                .collect();
            if candidates.is_empty() {
                debug!(?range, topic, "No documents in the date span lead with the topic");
                return Err(SelectionError::NoMatchingDocuments);
            }
            let pick = rng.random_range(0..candidates.len());
            candidates.swap_remove(pick)
        }
    };

    let document = &context.corpus().documents()[position];
    Ok(Selection {
        position,
        id: document.id,
        title: document.title.clone(),
        text: document.text.clone(),
        top3: context.vocabulary().names(ranking.indices()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::selection_context::test_corpus::*;
    use crate::selection::time_range::{SECONDS_PER_DAY, TimeRangeResolver};
    use anyhow::Result;
    use rand::{SeedableRng, rngs::StdRng};

    fn days(first: i64, last: i64) -> TimeRange {
        TimeRange {
            start: JAN_1_2020 + first * SECONDS_PER_DAY,
            end: JAN_1_2020 + (last + 1) * SECONDS_PER_DAY,
        }
    }

    #[test]
    fn test_topic_filter_from_index() {
        let vocabulary = TopicVocabulary::default();
        assert_eq!(TopicFilter::from_index(-1, &vocabulary), Ok(TopicFilter::Any));
        assert_eq!(
            TopicFilter::from_index(0, &vocabulary),
            Ok(TopicFilter::Dominant(0))
        );
        assert_eq!(
            TopicFilter::from_index(14, &vocabulary),
            Ok(TopicFilter::Dominant(14))
        );
        for bad in [-2, 15, i64::MIN] {
            assert_eq!(
                TopicFilter::from_index(bad, &vocabulary),
                Err(SelectionError::InvalidTopicIndex {
                    value: bad.to_string(),
                    topics: 15
                })
            );
        }
    }

    #[test]
    fn test_date_range_excludes_following_day() -> Result<()> {
        let context = make_test_context(&[0, 1, 2])?;
        let range = context.resolver().resolve("1/1/2020", "1/2/2020")?;
        assert_eq!(context.corpus().span(range.start, range.end), 0..2);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let selection = select(&context, range, TopicFilter::Any, &mut rng)?;
            assert!(selection.position < 2);
        }
        Ok(())
    }

    #[test]
    fn test_resolved_range_matches_span_members() -> Result<()> {
        let context = make_test_context(&[0; 10])?;
        let resolver = TimeRangeResolver::new(context.resolver().time_zone());
        let range = resolver.resolve("1/3/2020", "1/6/2020")?;
        let span = context.corpus().span(range.start, range.end);
        assert_eq!(span, 2..6);
        let documents = context.corpus().documents();
        assert!(span.clone().all(|p| range.contains(documents[p].timestamp)));
        assert!(!range.contains(documents[span.start - 1].timestamp));
        assert!(!range.contains(documents[span.end].timestamp));
        Ok(())
    }

    #[test]
    fn test_unconstrained_single_document_span() -> Result<()> {
        // the document's ranking is irrelevant without a topic constraint
        let context = make_test_context(&[3, 9, 12])?;
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select(&context, days(1, 1), TopicFilter::Any, &mut rng)?;
            assert_eq!(selection.position, 1);
            assert_eq!(selection.title, "title1");
            assert_eq!(selection.text, "text1");
            assert_eq!(selection.top3, vec!["Retail", "Valuation", "IPO/SEO"]);
        }
        Ok(())
    }

    #[test]
    fn test_unconstrained_stays_in_span() -> Result<()> {
        let context = make_test_context(&[0, 1, 2, 3, 4, 5, 6, 7])?;
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 8];
        for _ in 0..200 {
            let selection = select(&context, days(2, 5), TopicFilter::Any, &mut rng)?;
            assert!((2..6).contains(&selection.position));
            seen[selection.position] = true;
        }
        assert_eq!(seen, [false, false, true, true, true, true, false, false]);
        Ok(())
    }

    #[test]
    fn test_constrained_returns_dominant_topic_only() -> Result<()> {
        let dominant = [7, 2, 7, 7, 5, 2, 7];
        let context = make_test_context(&dominant)?;
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let selection = select(&context, days(1, 5), TopicFilter::Dominant(7), &mut rng)?;
            assert_eq!(dominant[selection.position], 7);
            assert_eq!(context.ranking(selection.position).dominant(), Some(7));
            assert_eq!(selection.top3[0], "Earnings");
            if !seen.contains(&selection.position) {
                seen.push(selection.position);
            }
        }
        seen.sort();
        assert_eq!(seen, vec![2, 3]);
        Ok(())
    }

    #[test]
    fn test_constrained_ignores_lower_ranks() -> Result<()> {
        // topic 1 is second in every row's ranking but never first
        let context = make_test_context(&[0, 0, 0])?;
        assert_eq!(context.ranking(0).indices(), &[0, 1, 2]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            select(&context, days(0, 2), TopicFilter::Dominant(1), &mut rng),
            Err(SelectionError::NoMatchingDocuments)
        );
        Ok(())
    }

    #[test]
    fn test_constrained_without_match() -> Result<()> {
        let context = make_test_context(&[0, 1, 2, 5])?;
        let mut rng = StdRng::seed_from_u64(5);
        // topic 5 leads only outside of the span
        assert_eq!(
            select(&context, days(0, 2), TopicFilter::Dominant(5), &mut rng),
            Err(SelectionError::NoMatchingDocuments)
        );
        assert_eq!(
            select(&context, days(0, 3), TopicFilter::Dominant(5), &mut rng)?.position,
            3
        );
        Ok(())
    }

    #[test]
    fn test_empty_span() -> Result<()> {
        let context = make_test_context(&[0, 1, 2])?;
        let mut rng = StdRng::seed_from_u64(11);
        for range in [days(-10, -1), days(3, 30)] {
            assert_eq!(
                select(&context, range, TopicFilter::Any, &mut rng),
                Err(SelectionError::NoMatchingDocuments)
            );
            assert_eq!(
                select(&context, range, TopicFilter::Dominant(0), &mut rng),
                Err(SelectionError::NoMatchingDocuments)
            );
        }
        let inverted = TimeRange {
            start: days(2, 2).start,
            end: days(0, 0).end,
        };
        assert_eq!(
            select(&context, inverted, TopicFilter::Any, &mut rng),
            Err(SelectionError::NoMatchingDocuments)
        );
        Ok(())
    }

    #[test]
    fn test_fixed_seed_is_reproducible() -> Result<()> {
        let context = make_test_context(&[4; 30])?;
        let run = |seed| -> Result<Vec<usize>> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| Ok(select(&context, days(0, 29), TopicFilter::Dominant(4), &mut rng)?.position))
                .collect()
        };
        assert_eq!(run(99)?, run(99)?);
        Ok(())
    }
}
