use serde::{Deserialize, Serialize};
use std::fmt;

/// The four nesting levels of the timeline tree, root to leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Period,
    Cycle,
    Week,
    Day,
}

impl Level {
    /// The level whose containers hold nodes of this level, if any
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Period => None,
            Level::Cycle => Some(Level::Period),
            Level::Week => Some(Level::Cycle),
            Level::Day => Some(Level::Week),
        }
    }

    /// The level directly contained by nodes of this level, if any
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Period => Some(Level::Cycle),
            Level::Cycle => Some(Level::Week),
            Level::Week => Some(Level::Day),
            Level::Day => None,
        }
    }

    /// Capitalized label used for default node names and outlines
    pub fn label(self) -> &'static str {
        match self {
            Level::Period => "Period",
            Level::Cycle => "Cycle",
            Level::Week => "Week",
            Level::Day => "Day",
        }
    }

    pub fn parse_level(s: &str) -> Option<Level> {
        match s {
            "period" => Some(Level::Period),
            "cycle" => Some(Level::Cycle),
            "week" => Some(Level::Week),
            "day" => Some(Level::Day),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Period => write!(f, "period"),
            Level::Cycle => write!(f, "cycle"),
            Level::Week => write!(f, "week"),
            Level::Day => write!(f, "day"),
        }
    }
}

/// A leaf visit day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: String,
    pub name: String,
    /// Free-text duration like "24h"; not interpreted
    #[serde(default)]
    pub duration: Option<String>,
}

impl Day {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Day {
            id: id.into(),
            name: name.into(),
            duration: None,
        }
    }
}

/// A week of visit days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub days: Vec<Day>,
}

impl Week {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Week {
            id: id.into(),
            name: name.into(),
            duration: None,
            days: Vec::new(),
        }
    }

    /// Number of grid columns this week spans (one per day)
    pub fn column_span(&self) -> usize {
        self.days.len()
    }
}

/// A treatment cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub weeks: Vec<Week>,
}

impl Cycle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Cycle {
            id: id.into(),
            name: name.into(),
            duration: None,
            weeks: Vec::new(),
        }
    }

    pub fn column_span(&self) -> usize {
        self.weeks.iter().map(Week::column_span).sum()
    }
}

/// A study period (screening, treatment, follow-up, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub cycles: Vec<Cycle>,
}

impl Period {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Period {
            id: id.into(),
            name: name.into(),
            duration: None,
            cycles: Vec::new(),
        }
    }

    pub fn column_span(&self) -> usize {
        self.cycles.iter().map(Cycle::column_span).sum()
    }
}

/// The whole Period ⊃ Cycle ⊃ Week ⊃ Day tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub periods: Vec<Period>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            periods: Vec::new(),
        }
    }

    /// All day leaves in tree order. This ordering is the canonical visit
    /// sequence: column layout and visit numbering both derive from it.
    pub fn flatten_days(&self) -> Vec<&Day> {
        let mut days = Vec::new();
        for period in &self.periods {
            for cycle in &period.cycles {
                for week in &cycle.weeks {
                    days.extend(week.days.iter());
                }
            }
        }
        days
    }

    pub fn total_day_count(&self) -> usize {
        self.flatten_days().len()
    }

    /// 1-based position of a day in the visit sequence
    pub fn visit_number(&self, day_id: &str) -> Option<usize> {
        self.flatten_days()
            .iter()
            .position(|d| d.id == day_id)
            .map(|i| i + 1)
    }

    /// Owned ids of all day leaves, in visit order
    pub fn day_ids(&self) -> Vec<String> {
        self.flatten_days().iter().map(|d| d.id.clone()).collect()
    }

    /// Indented plain-text dump of the tree, for tests and debugging
    pub fn outline(&self) -> String {
        fn line(out: &mut Vec<String>, indent: usize, level: Level, id: &str, name: &str, duration: &Option<String>) {
            let pad = "  ".repeat(indent);
            match duration {
                Some(d) => out.push(format!("{}{} {} \"{}\" ({})", pad, level.label(), id, name, d)),
                None => out.push(format!("{}{} {} \"{}\"", pad, level.label(), id, name)),
            }
        }
        let mut out = Vec::new();
        for period in &self.periods {
            line(&mut out, 0, Level::Period, &period.id, &period.name, &period.duration);
            for cycle in &period.cycles {
                line(&mut out, 1, Level::Cycle, &cycle.id, &cycle.name, &cycle.duration);
                for week in &cycle.weeks {
                    line(&mut out, 2, Level::Week, &week.id, &week.name, &week.duration);
                    for day in &week.days {
                        line(&mut out, 3, Level::Day, &day.id, &day.name, &day.duration);
                    }
                }
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// P1{C1{W1{D1,D2}, W2{D3}}}, P2{C2{W3{D4}}}
    fn sample_timeline() -> Timeline {
        let mut w1 = Week::new("w1", "Week 1");
        w1.days.push(Day::new("d1", "Day 1"));
        w1.days.push(Day::new("d2", "Day 2"));
        let mut w2 = Week::new("w2", "Week 2");
        w2.days.push(Day::new("d3", "Day 3"));
        let mut c1 = Cycle::new("c1", "Cycle 1");
        c1.weeks.push(w1);
        c1.weeks.push(w2);
        let mut p1 = Period::new("p1", "Screening");
        p1.cycles.push(c1);

        let mut w3 = Week::new("w3", "Week 3");
        w3.days.push(Day::new("d4", "Day 4"));
        let mut c2 = Cycle::new("c2", "Cycle 2");
        c2.weeks.push(w3);
        let mut p2 = Period::new("p2", "Treatment");
        p2.cycles.push(c2);

        Timeline {
            periods: vec![p1, p2],
        }
    }

    #[test]
    fn level_navigation() {
        assert_eq!(Level::Period.parent(), None);
        assert_eq!(Level::Cycle.parent(), Some(Level::Period));
        assert_eq!(Level::Week.parent(), Some(Level::Cycle));
        assert_eq!(Level::Day.parent(), Some(Level::Week));
        assert_eq!(Level::Period.child(), Some(Level::Cycle));
        assert_eq!(Level::Day.child(), None);
    }

    #[test]
    fn level_display_parse_round_trip() {
        for level in [Level::Period, Level::Cycle, Level::Week, Level::Day] {
            assert_eq!(Level::parse_level(&level.to_string()), Some(level));
        }
        assert_eq!(Level::parse_level("month"), None);
    }

    #[test]
    fn flatten_days_is_tree_order() {
        let tl = sample_timeline();
        let ids: Vec<&str> = tl.flatten_days().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3", "d4"]);
    }

    #[test]
    fn total_day_count_sums_leaves() {
        assert_eq!(sample_timeline().total_day_count(), 4);
        assert_eq!(Timeline::new().total_day_count(), 0);
    }

    #[test]
    fn column_spans_match_leaf_counts() {
        let tl = sample_timeline();
        assert_eq!(tl.periods[0].column_span(), 3);
        assert_eq!(tl.periods[0].cycles[0].column_span(), 3);
        assert_eq!(tl.periods[0].cycles[0].weeks[0].column_span(), 2);
        assert_eq!(tl.periods[1].column_span(), 1);
    }

    #[test]
    fn visit_numbers_follow_the_sequence() {
        let tl = sample_timeline();
        assert_eq!(tl.visit_number("d1"), Some(1));
        assert_eq!(tl.visit_number("d3"), Some(3));
        assert_eq!(tl.visit_number("d4"), Some(4));
        assert_eq!(tl.visit_number("nope"), None);
    }

    #[test]
    fn day_ids_in_visit_order() {
        assert_eq!(sample_timeline().day_ids(), vec!["d1", "d2", "d3", "d4"]);
    }

    #[test]
    fn outline_snapshot() {
        let mut tl = sample_timeline();
        tl.periods[0].cycles[0].duration = Some("28 days".into());
        insta::assert_snapshot!(tl.outline(), @r#"
        Period p1 "Screening"
          Cycle c1 "Cycle 1" (28 days)
            Week w1 "Week 1"
              Day d1 "Day 1"
              Day d2 "Day 2"
            Week w2 "Week 2"
              Day d3 "Day 3"
        Period p2 "Treatment"
          Cycle c2 "Cycle 2"
            Week w3 "Week 3"
              Day d4 "Day 4"
        "#);
    }

    #[test]
    fn outline_of_empty_tree_is_empty() {
        assert_eq!(Timeline::new().outline(), "");
    }
}
