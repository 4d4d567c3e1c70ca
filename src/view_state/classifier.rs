//! Separator classification between adjacent messages.
//!
//! Pure functions: the same pair always produces the same [`Separator`],
//! independent of call order. Time zone is an explicit input.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::model::Message;

/// Minimum gap between two messages that counts as a pause in the conversation.
const TIME_GAP_MINUTES: i64 = 1;

/// One reason to put extra space between two adjacent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpacingRule {
    /// The earlier message of the pair has thread replies.
    Thread,
    /// At least one minute passed between the two messages.
    TimeGap,
    /// The two messages have different authors.
    AuthorChange,
    /// The earlier message of the pair is deleted.
    Deleted,
    /// No other rule fired.
    Default,
}

impl SpacingRule {
    const ALL: [SpacingRule; 5] = [
        SpacingRule::Thread,
        SpacingRule::TimeGap,
        SpacingRule::AuthorChange,
        SpacingRule::Deleted,
        SpacingRule::Default,
    ];

    fn bit(self) -> u8 {
        match self {
            SpacingRule::Thread => 1,
            SpacingRule::TimeGap => 1 << 1,
            SpacingRule::AuthorChange => 1 << 2,
            SpacingRule::Deleted => 1 << 3,
            SpacingRule::Default => 1 << 4,
        }
    }

    /// Relative spacing weight in logical pixels.
    fn weight(self) -> u16 {
        match self {
            SpacingRule::Default => 2,
            SpacingRule::Deleted => 4,
            SpacingRule::Thread | SpacingRule::TimeGap => 8,
            SpacingRule::AuthorChange => 12,
        }
    }
}

/// Non-exclusive set of [`SpacingRule`]s fired for one pair.
///
/// Never empty once produced by [`LayoutClassifier::classify`]: if nothing
/// else fired, it holds exactly [`SpacingRule::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpacingRules(u8);

impl SpacingRules {
    /// No rules.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Add `rule` to the set.
    pub fn insert(&mut self, rule: SpacingRule) {
        self.0 |= rule.bit();
    }

    /// Whether `rule` fired.
    pub fn contains(&self, rule: SpacingRule) -> bool {
        self.0 & rule.bit() != 0
    }

    /// True when no rule fired.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of rules that fired.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Rules in a fixed order: thread, time gap, author change, deleted, default.
    pub fn iter(&self) -> impl Iterator<Item = SpacingRule> + '_ {
        SpacingRule::ALL
            .into_iter()
            .filter(move |rule| self.contains(*rule))
    }

    /// Spacing the renderer should leave, the largest weight of any fired rule.
    ///
    /// `{Default}` yields the smallest hint of all non-empty sets.
    pub fn spacing_hint(&self) -> u16 {
        self.iter().map(SpacingRule::weight).max().unwrap_or(0)
    }
}

impl FromIterator<SpacingRule> for SpacingRules {
    fn from_iter<T: IntoIterator<Item = SpacingRule>>(iter: T) -> Self {
        let mut rules = Self::empty();
        for rule in iter {
            rules.insert(rule);
        }
        rules
    }
}

/// What goes between two adjacent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// The pair crosses a calendar day; shows the day being entered.
    /// Takes precedence over spacing rules.
    DateDivider(NaiveDate),
    /// Same day; spacing driven by the fired rules.
    Spacing(SpacingRules),
}

/// Decides the separator for each pair of adjacent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutClassifier {
    time_zone: FixedOffset,
}

impl LayoutClassifier {
    /// Classifier that decides calendar days in `time_zone` (the viewer's zone).
    pub fn new(time_zone: FixedOffset) -> Self {
        Self { time_zone }
    }

    /// Classifier for a viewer in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Zone used to split calendar days
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }

    /// Calendar day of `message` in the viewer's time zone.
    pub fn calendar_day(&self, message: &Message) -> NaiveDate {
        message.created_at().with_timezone(&self.time_zone).date_naive()
    }

    /// Classify the gap between `message` and `next`.
    ///
    /// `message` is the one at the lower store position; thread and deleted
    /// rules look at it. Time and author rules are symmetric.
    pub fn classify(&self, message: &Message, next: &Message) -> Separator {
        let day = self.calendar_day(message);
        let next_day = self.calendar_day(next);
        if day != next_day {
            return Separator::DateDivider(day.max(next_day));
        }

        let mut rules = SpacingRules::empty();

        let elapsed = (next.created_at() - message.created_at()).num_minutes().abs();
        if elapsed >= TIME_GAP_MINUTES {
            rules.insert(SpacingRule::TimeGap);
        }
        if message.author_id() != next.author_id() {
            rules.insert(SpacingRule::AuthorChange);
        }
        if message.has_replies() {
            rules.insert(SpacingRule::Thread);
        }
        if message.is_deleted() {
            rules.insert(SpacingRule::Deleted);
        }
        if rules.is_empty() {
            rules.insert(SpacingRule::Default);
        }

        Separator::Spacing(rules)
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MessageId, UserId};
    use chrono::{DateTime, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    fn msg(id: &str, author: &str, created_at: DateTime<Utc>) -> Message {
        Message::new(
            MessageId::new(id).unwrap(),
            UserId::new(author).unwrap(),
            created_at,
            "text",
        )
    }

    fn rules(separator: Separator) -> SpacingRules {
        match separator {
            Separator::Spacing(rules) => rules,
            Separator::DateDivider(day) => panic!("expected spacing, got divider for {day}"),
        }
    }

    #[test]
    fn same_author_same_minute_is_default() {
        let c = LayoutClassifier::utc();
        let a = msg("a", "x", at(12, 0, 0));
        let b = msg("b", "x", at(12, 0, 30));

        let r = rules(c.classify(&a, &b));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![SpacingRule::Default]);
    }

    #[test]
    fn author_change_fires() {
        let c = LayoutClassifier::utc();
        let a = msg("a", "x", at(12, 0, 0));
        let b = msg("b", "y", at(12, 0, 10));

        let r = rules(c.classify(&a, &b));
        assert!(r.contains(SpacingRule::AuthorChange));
        assert!(!r.contains(SpacingRule::Default));
    }

    #[test]
    fn one_minute_gap_fires_in_either_order() {
        let c = LayoutClassifier::utc();
        let a = msg("a", "x", at(12, 0, 0));
        let b = msg("b", "x", at(12, 1, 0));

        assert!(rules(c.classify(&a, &b)).contains(SpacingRule::TimeGap));
        assert!(rules(c.classify(&b, &a)).contains(SpacingRule::TimeGap));
    }

    #[test]
    fn fifty_nine_seconds_is_not_a_gap() {
        let c = LayoutClassifier::utc();
        let a = msg("a", "x", at(12, 0, 0));
        let b = msg("b", "x", at(12, 0, 59));

        assert!(!rules(c.classify(&a, &b)).contains(SpacingRule::TimeGap));
    }

    #[test]
    fn thread_and_deleted_look_at_first_message_only() {
        let c = LayoutClassifier::utc();
        let root = msg("a", "x", at(12, 0, 0))
            .with_reply_count(2)
            .with_deleted(true);
        let plain = msg("b", "x", at(12, 0, 5));

        let forward = rules(c.classify(&root, &plain));
        assert!(forward.contains(SpacingRule::Thread));
        assert!(forward.contains(SpacingRule::Deleted));

        let backward = rules(c.classify(&plain, &root));
        assert!(!backward.contains(SpacingRule::Thread));
        assert!(!backward.contains(SpacingRule::Deleted));
    }

    #[test]
    fn rules_combine() {
        let c = LayoutClassifier::utc();
        let a = msg("a", "x", at(12, 0, 0)).with_reply_count(1);
        let b = msg("b", "y", at(12, 5, 0));

        let r = rules(c.classify(&a, &b));
        assert_eq!(r.len(), 3);
        assert_eq!(
            r.iter().collect::<Vec<_>>(),
            vec![
                SpacingRule::Thread,
                SpacingRule::TimeGap,
                SpacingRule::AuthorChange
            ]
        );
    }

    #[test]
    fn day_boundary_emits_divider_with_later_day() {
        let c = LayoutClassifier::utc();
        let newer = msg("b", "y", Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 1).unwrap());
        let older = msg("a", "x", Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());

        let expected = Separator::DateDivider(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(c.classify(&newer, &older), expected);
        assert_eq!(c.classify(&older, &newer), expected);
    }

    #[test]
    fn calendar_day_uses_viewer_time_zone() {
        // 23:30 UTC on March 1 and 00:30 UTC on March 2 are the same day at UTC-02:00.
        let a = msg("a", "x", Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap());
        let b = msg("b", "x", Utc.with_ymd_and_hms(2024, 3, 2, 0, 30, 0).unwrap());

        let utc = LayoutClassifier::utc();
        assert!(matches!(utc.classify(&a, &b), Separator::DateDivider(_)));

        let west = LayoutClassifier::new(FixedOffset::west_opt(2 * 3600).unwrap());
        assert!(matches!(west.classify(&a, &b), Separator::Spacing(_)));
    }

    #[test]
    fn default_hint_is_smallest() {
        let default: SpacingRules = [SpacingRule::Default].into_iter().collect();
        for rule in [
            SpacingRule::Thread,
            SpacingRule::TimeGap,
            SpacingRule::AuthorChange,
            SpacingRule::Deleted,
        ] {
            let fired: SpacingRules = [rule].into_iter().collect();
            assert!(default.spacing_hint() < fired.spacing_hint(), "{rule:?}");
        }
    }
}
