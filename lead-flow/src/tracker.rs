use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::SectionLayout, section::Section};

/// Vertical extent of one page section.
///
/// `None` means the element is not on the page; such sections are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    pub section: Section,
    pub start: Option<f64>,
    pub height: Option<f64>,
}

impl SectionBounds {
    pub fn new(section: Section, start: f64, height: f64) -> Self {
        Self {
            section,
            start: Some(start),
            height: Some(height),
        }
    }

    pub fn missing(section: Section) -> Self {
        Self {
            section,
            start: None,
            height: None,
        }
    }

    fn contains(&self, position: f64) -> bool {
        match (self.start, self.height) {
            (Some(start), Some(height)) => position >= start && position < start + height,
            _ => false,
        }
    }
}

/// Edge notification from the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionChange {
    pub from: Section,
    pub to: Section,
}

/// Works out which section the visitor is looking at from the scroll offset
#[derive(Debug, Clone)]
pub struct SectionTracker {
    bounds: Vec<SectionBounds>,
    lookahead: f64,
    current: Section,
}

impl SectionTracker {
    pub fn new(bounds: Vec<SectionBounds>, lookahead: f64) -> Self {
        Self {
            bounds,
            lookahead,
            current: Section::default(),
        }
    }

    pub fn from_layout(layout: &SectionLayout) -> Self {
        Self::new(layout.sections.clone(), layout.lookahead)
    }

    pub fn current(&self) -> Section {
        self.current
    }

    /// First section containing `offset + lookahead`, without recording anything
    pub fn locate(&self, offset: f64) -> Option<Section> {
        let position = offset + self.lookahead;
        self.bounds
            .iter()
            .find(|bounds| bounds.contains(position))
            .map(|bounds| bounds.section)
    }

    /// Feed a scroll offset. Returns a change only when the section differs from the
    /// last one recorded; offsets outside every section keep the last one.
    pub fn observe(&mut self, offset: f64) -> Option<SectionChange> {
        let located = self.locate(offset)?;
        if located == self.current {
            return None;
        }

        let change = SectionChange {
            from: self.current,
            to: located,
        };
        debug!(offset, from = %change.from, to = %change.to, "section changed");
        self.current = located;
        Some(change)
    }

    /// Replace the extent of a section after a layout change
    pub fn update_bounds(&mut self, section: Section, start: Option<f64>, height: Option<f64>) {
        match self.bounds.iter_mut().find(|b| b.section == section) {
            Some(bounds) => {
                bounds.start = start;
                bounds.height = height;
            }
            None => self.bounds.push(SectionBounds {
                section,
                start,
                height,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SectionTracker {
        SectionTracker::from_layout(&SectionLayout::default())
    }

    #[test]
    fn test_one_notification_per_change() {
        let mut tracker = tracker();
        let mut changes = Vec::new();
        // scroll ticks from the top of the page into the lots section
        for offset in (0..=1500).step_by(25) {
            if let Some(change) = tracker.observe(offset as f64) {
                changes.push(change);
            }
        }
        assert_eq!(
            changes,
            vec![SectionChange {
                from: Section::Home,
                to: Section::Lots
            }]
        );
        assert_eq!(tracker.current(), Section::Lots);
    }

    #[test]
    fn test_same_offset_is_idempotent() {
        let mut tracker = tracker();
        assert!(tracker.observe(2500.0).is_some());
        assert_eq!(tracker.current(), Section::Advantages);
        assert_eq!(tracker.observe(2500.0), None);
        assert_eq!(tracker.locate(2500.0), Some(Section::Advantages));
        assert_eq!(tracker.current(), Section::Advantages);
    }

    #[test]
    fn test_lookahead_is_applied() {
        let tracker = tracker();
        // 700 + 200 lands on the first pixel of lots
        assert_eq!(tracker.locate(699.0), Some(Section::Home));
        assert_eq!(tracker.locate(700.0), Some(Section::Lots));
    }

    #[test]
    fn test_offset_outside_layout_keeps_last_section() {
        let mut tracker = tracker();
        tracker.observe(4300.0);
        assert_eq!(tracker.current(), Section::Contact);
        assert_eq!(tracker.observe(90_000.0), None);
        assert_eq!(tracker.current(), Section::Contact);
    }

    #[test]
    fn test_missing_section_is_skipped() {
        let mut tracker = SectionTracker::new(
            vec![
                SectionBounds::new(Section::Home, 0.0, 500.0),
                SectionBounds::missing(Section::Lots),
                SectionBounds::new(Section::Contact, 500.0, 500.0),
            ],
            0.0,
        );
        assert_eq!(
            tracker.observe(600.0),
            Some(SectionChange {
                from: Section::Home,
                to: Section::Contact
            })
        );

        tracker.update_bounds(Section::Lots, Some(400.0), Some(300.0));
        // lots is scanned before contact
        assert_eq!(tracker.locate(600.0), Some(Section::Lots));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let tracker = SectionTracker::new(
            vec![
                SectionBounds::new(Section::Lots, 0.0, 1000.0),
                SectionBounds::new(Section::Advantages, 500.0, 1000.0),
            ],
            0.0,
        );
        assert_eq!(tracker.locate(700.0), Some(Section::Lots));
        assert_eq!(tracker.locate(1200.0), Some(Section::Advantages));
    }
}
