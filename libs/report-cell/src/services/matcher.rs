use std::collections::HashMap;

use shared_config::MatchMode;
use shared_models::PatientRecord;

#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    record: usize,
    is_real: bool,
}

/// Per-run lookup from names to registry rows. Built from one registry read
/// and dropped when the run ends.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    records: Vec<PatientRecord>,
    by_real: HashMap<String, usize>,
    by_display: HashMap<String, usize>,
    candidates: Vec<Candidate>,
}

impl NameIndex {
    pub fn build(records: &[PatientRecord]) -> Self {
        let mut index = Self {
            records: records.to_vec(),
            ..Self::default()
        };

        for (pos, record) in records.iter().enumerate() {
            let real = record.real_name.trim();
            let display = record.display_name.trim();

            if !real.is_empty() {
                index.by_real.entry(real.to_string()).or_insert(pos);
                index.candidates.push(Candidate {
                    name: real.to_string(),
                    record: pos,
                    is_real: true,
                });
            }
            if !display.is_empty() {
                index.by_display.entry(display.to_string()).or_insert(pos);
                index.candidates.push(Candidate {
                    name: display.to_string(),
                    record: pos,
                    is_real: false,
                });
            }
        }

        index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn exact(&self, name: &str) -> Option<&PatientRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.by_real
            .get(name)
            .or_else(|| self.by_display.get(name))
            .map(|&pos| &self.records[pos])
    }

    fn containing(&self, title: &str) -> Option<&PatientRecord> {
        let mut best: Option<(&Candidate, usize)> = None;

        for candidate in &self.candidates {
            if !title.contains(candidate.name.as_str()) {
                continue;
            }
            let len = candidate.name.chars().count();
            let better = match best {
                None => true,
                Some((current, current_len)) => {
                    len > current_len
                        || (len == current_len && candidate.is_real && !current.is_real)
                }
            };
            if better {
                best = Some((candidate, len));
            }
        }

        best.map(|(candidate, _)| &self.records[candidate.record])
    }
}

/// How an event title is tied to a registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Extracted name looked up by real name, then by display name.
    ExactKey,
    /// Longest registered name appearing anywhere in the title.
    Containment,
}

impl From<MatchMode> for MatchStrategy {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Exact => MatchStrategy::ExactKey,
            MatchMode::Containment => MatchStrategy::Containment,
        }
    }
}

impl MatchStrategy {
    pub fn resolve<'a>(
        &self,
        index: &'a NameIndex,
        title: &str,
        extracted: &str,
    ) -> Option<&'a PatientRecord> {
        match self {
            MatchStrategy::ExactKey => index.exact(extracted),
            MatchStrategy::Containment => index.containing(title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Vec<PatientRecord> {
        vec![
            PatientRecord::new("Ming", "王小明", "U1"),
            PatientRecord::new("小明明", "", "U2"),
            PatientRecord::new("Hua", "林小華", "U3"),
            PatientRecord::new("林小華", "", "U4"),
        ]
    }

    #[test]
    fn test_exact_prefers_real_name() {
        let index = NameIndex::build(&registry());
        let strategy = MatchStrategy::ExactKey;

        let hit = strategy.resolve(&index, "門診-林小華 2", "林小華").unwrap();
        assert_eq!(hit.external_id, "U3");

        let hit = strategy.resolve(&index, "門診-Ming 1", "Ming").unwrap();
        assert_eq!(hit.external_id, "U1");
    }

    #[test]
    fn test_exact_misses() {
        let index = NameIndex::build(&registry());
        let strategy = MatchStrategy::ExactKey;

        assert!(strategy.resolve(&index, "門診-王小 2", "王小").is_none());
        assert!(strategy.resolve(&index, "門診- 2", "").is_none());
    }

    #[test]
    fn test_containment_picks_longest_name() {
        let records = vec![
            PatientRecord::new("", "小明", "U1"),
            PatientRecord::new("小明明", "", "U2"),
        ];
        let index = NameIndex::build(&records);
        let strategy = MatchStrategy::Containment;

        let hit = strategy.resolve(&index, "門診-小明明 2", "小明明").unwrap();
        assert_eq!(hit.external_id, "U2");

        let hit = strategy.resolve(&index, "門診-小明 2", "小明").unwrap();
        assert_eq!(hit.external_id, "U1");
    }

    #[test]
    fn test_containment_tie_prefers_real_then_order() {
        let index = NameIndex::build(&registry());
        let hit = MatchStrategy::Containment
            .resolve(&index, "居家-林小華（2樓）", "林小華")
            .unwrap();
        assert_eq!(hit.external_id, "U3");

        let records = vec![
            PatientRecord::new("阿華", "", "U7"),
            PatientRecord::new("阿華", "", "U8"),
        ];
        let index = NameIndex::build(&records);
        let hit = MatchStrategy::Containment.resolve(&index, "門診-阿華", "阿華").unwrap();
        assert_eq!(hit.external_id, "U7");
    }

    #[test]
    fn test_strategy_from_mode() {
        assert_eq!(MatchStrategy::from(MatchMode::Exact), MatchStrategy::ExactKey);
        assert_eq!(MatchStrategy::from(MatchMode::Containment), MatchStrategy::Containment);
    }
}
