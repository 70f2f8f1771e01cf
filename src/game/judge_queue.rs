use crate::game::sensor::{LANE_COUNT, SensorArea};
use log::debug;
use rustc_hash::FxHashMap;

/// Position of a tap note in its lane's judgment order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapQueueInfo {
    /// Tap lane, 1..=8.
    pub key_index: u8,
    pub index: u32,
}

/// Position of a touch note in its sensor's judgment order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchQueueInfo {
    pub sensor_pos: SensorArea,
    pub index: u32,
}

/// Per-lane and per-sensor judgment watermarks.
///
/// A note may be judged while its ordinal is at or behind the watermark of
/// its lane. Watermarks only move forward, one note per accepted `next_*`.
#[derive(Clone, Debug, Default)]
pub struct NoteJudgeQueue {
    note_current_index: FxHashMap<u8, u32>,
    touch_current_index: FxHashMap<SensorArea, u32>,
}

impl NoteJudgeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-registers lanes 1..=8 and sensors A1..=E8 at watermark 0.
    pub fn reset_counter(&mut self) {
        self.note_current_index.clear();
        self.touch_current_index.clear();
        for lane in 1..=LANE_COUNT as u8 {
            self.note_current_index.insert(lane, 0);
        }
        for area in SensorArea::playable() {
            self.touch_current_index.insert(area, 0);
        }
    }

    /// Forgets every lane; nothing can be judged until the next `reset_counter`.
    pub fn clear(&mut self) {
        self.note_current_index.clear();
        self.touch_current_index.clear();
    }

    #[inline(always)]
    pub fn can_judge_tap(&self, info: &TapQueueInfo) -> bool {
        self.note_current_index
            .get(&info.key_index)
            .is_some_and(|&current| info.index <= current)
    }

    #[inline(always)]
    pub fn can_judge_touch(&self, info: &TouchQueueInfo) -> bool {
        self.touch_current_index
            .get(&info.sensor_pos)
            .is_some_and(|&current| info.index <= current)
    }

    pub fn next_note(&mut self, info: &TapQueueInfo) {
        let Some(current) = self.note_current_index.get_mut(&info.key_index) else {
            debug!("next_note on unregistered lane {}", info.key_index);
            return;
        };
        if *current > info.index {
            debug!(
                "Stale advance on lane {}: note {} is behind watermark {}",
                info.key_index, info.index, *current
            );
            return;
        }
        *current += 1;
    }

    pub fn next_touch(&mut self, info: &TouchQueueInfo) {
        let Some(current) = self.touch_current_index.get_mut(&info.sensor_pos) else {
            debug!("next_touch on unregistered sensor {}", info.sensor_pos);
            return;
        };
        if *current > info.index {
            debug!(
                "Stale advance on sensor {}: note {} is behind watermark {}",
                info.sensor_pos, info.index, *current
            );
            return;
        }
        *current += 1;
    }

    #[inline(always)]
    pub fn current_note_index(&self, lane: u8) -> Option<u32> {
        self.note_current_index.get(&lane).copied()
    }

    #[inline(always)]
    pub fn current_touch_index(&self, area: SensorArea) -> Option<u32> {
        self.touch_current_index.get(&area).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteJudgeQueue, TapQueueInfo, TouchQueueInfo};
    use crate::game::sensor::SensorArea;
    use proptest::prelude::*;

    const fn tap(lane: u8, index: u32) -> TapQueueInfo {
        TapQueueInfo {
            key_index: lane,
            index,
        }
    }

    const fn touch(area: SensorArea, index: u32) -> TouchQueueInfo {
        TouchQueueInfo {
            sensor_pos: area,
            index,
        }
    }

    fn fresh() -> NoteJudgeQueue {
        let mut queue = NoteJudgeQueue::new();
        queue.reset_counter();
        queue
    }

    #[test]
    fn empty_queue_judges_nothing() {
        let queue = NoteJudgeQueue::new();
        assert!(!queue.can_judge_tap(&tap(1, 0)));
        assert!(!queue.can_judge_touch(&touch(SensorArea::C, 0)));
    }

    #[test]
    fn reset_opens_first_note_of_every_lane() {
        let queue = fresh();
        for lane in 1..=8 {
            assert!(queue.can_judge_tap(&tap(lane, 0)), "lane {lane} note 0");
            assert!(!queue.can_judge_tap(&tap(lane, 1)), "lane {lane} note 1");
        }
        for area in SensorArea::playable() {
            assert!(queue.can_judge_touch(&touch(area, 0)), "{area} note 0");
            assert!(!queue.can_judge_touch(&touch(area, 1)), "{area} note 1");
        }
    }

    #[test]
    fn unknown_keys_fail_closed() {
        let queue = fresh();
        assert!(!queue.can_judge_tap(&tap(0, 0)));
        assert!(!queue.can_judge_tap(&tap(9, 0)));
        assert!(!queue.can_judge_touch(&touch(SensorArea::Test, 0)));
    }

    #[test]
    fn single_lane_advance_scenario() {
        let mut queue = fresh();
        queue.next_note(&tap(1, 0));
        assert_eq!(queue.current_note_index(1), Some(1));
        assert!(queue.can_judge_tap(&tap(1, 0)));
        assert!(queue.can_judge_tap(&tap(1, 1)), "watermark 1 admits note 1");
        assert!(!queue.can_judge_tap(&tap(1, 2)));

        queue.next_note(&tap(1, 0));
        assert_eq!(
            queue.current_note_index(1),
            Some(1),
            "a duplicate advance for note 0 must not move the watermark"
        );
        assert_eq!(queue.current_note_index(2), Some(0), "other lanes untouched");
    }

    #[test]
    fn advance_is_one_step_regardless_of_gap() {
        let mut queue = fresh();
        queue.next_note(&tap(4, 10));
        assert_eq!(queue.current_note_index(4), Some(1));
        queue.next_touch(&touch(SensorArea::E3, 7));
        assert_eq!(queue.current_touch_index(SensorArea::E3), Some(1));
    }

    #[test]
    fn advancing_unknown_keys_is_a_noop() {
        let mut queue = NoteJudgeQueue::new();
        queue.next_note(&tap(1, 0));
        queue.next_touch(&touch(SensorArea::A1, 0));
        assert_eq!(queue.current_note_index(1), None);
        assert_eq!(queue.current_touch_index(SensorArea::A1), None);
    }

    #[test]
    fn reset_rewinds_after_play() {
        let mut queue = fresh();
        for i in 0..5 {
            queue.next_note(&tap(2, i));
            queue.next_touch(&touch(SensorArea::B2, i));
        }
        assert_eq!(queue.current_note_index(2), Some(5));
        queue.reset_counter();
        assert_eq!(queue.current_note_index(2), Some(0));
        assert_eq!(queue.current_touch_index(SensorArea::B2), Some(0));
        queue.clear();
        assert!(!queue.can_judge_tap(&tap(2, 0)));
    }

    proptest! {
        #[test]
        fn watermark_admits_exactly_the_prefix(advances in 0u32..64, probe in 0u32..128, lane in 1u8..=8) {
            let mut queue = fresh();
            for i in 0..advances {
                queue.next_note(&tap(lane, i));
            }
            let current = queue.current_note_index(lane).unwrap();
            prop_assert_eq!(current, advances);
            prop_assert_eq!(queue.can_judge_tap(&tap(lane, probe)), probe <= current);
        }

        #[test]
        fn stale_or_ahead_calls_move_at_most_one(start in 0u32..32, ordinal in 0u32..64) {
            let mut queue = fresh();
            for i in 0..start {
                queue.next_touch(&touch(SensorArea::D5, i));
            }
            let before = queue.current_touch_index(SensorArea::D5).unwrap();
            queue.next_touch(&touch(SensorArea::D5, ordinal));
            let after = queue.current_touch_index(SensorArea::D5).unwrap();
            if before > ordinal {
                prop_assert_eq!(after, before);
            } else {
                prop_assert_eq!(after, before + 1);
            }
        }
    }
}
