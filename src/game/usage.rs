use crate::game::sensor::{BUTTON_COUNT, SENSOR_COUNT, SensorArea};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UsageBank {
    Button,
    Sensor,
}

/// Index-addressed handle to one usage flag.
///
/// Handles are plain data: the flag itself stays in [`UsageFlagBank`], and
/// anyone holding the bank can read or claim it through the handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UsageSlot {
    bank: UsageBank,
    index: u8,
}

impl UsageSlot {
    #[inline(always)]
    pub const fn button(area: SensorArea) -> Option<Self> {
        if area.is_button_area() {
            Some(Self {
                bank: UsageBank::Button,
                index: area.ordinal(),
            })
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn sensor(area: SensorArea) -> Option<Self> {
        if area.is_playable() {
            Some(Self {
                bank: UsageBank::Sensor,
                index: area.ordinal(),
            })
        } else {
            None
        }
    }

    /// Slot for an event on `area`, picking the button bank when `is_button`.
    #[inline(always)]
    pub const fn for_event(area: SensorArea, is_button: bool) -> Option<Self> {
        if is_button {
            Self::button(area)
        } else {
            Self::sensor(area)
        }
    }

    #[inline(always)]
    pub const fn bank(self) -> UsageBank {
        self.bank
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

/// Per fixed tick "already consumed" flags, one per button and one per touch sensor.
#[derive(Clone, Debug)]
pub struct UsageFlagBank {
    buttons: [bool; BUTTON_COUNT],
    sensors: [bool; SENSOR_COUNT],
}

impl Default for UsageFlagBank {
    fn default() -> Self {
        Self {
            buttons: [false; BUTTON_COUNT],
            sensors: [false; SENSOR_COUNT],
        }
    }
}

impl UsageFlagBank {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn reset_all(&mut self) {
        self.buttons.fill(false);
        self.sensors.fill(false);
    }

    #[inline(always)]
    pub fn get(&self, slot: UsageSlot) -> bool {
        match slot.bank {
            UsageBank::Button => self.buttons[slot.index()],
            UsageBank::Sensor => self.sensors[slot.index()],
        }
    }

    #[inline(always)]
    pub fn cell_mut(&mut self, slot: UsageSlot) -> &mut bool {
        match slot.bank {
            UsageBank::Button => &mut self.buttons[slot.index()],
            UsageBank::Sensor => &mut self.sensors[slot.index()],
        }
    }

    #[inline(always)]
    pub fn set(&mut self, slot: UsageSlot, used: bool) {
        *self.cell_mut(slot) = used;
    }

    /// Marks the slot as used and returns whether this call was the one that claimed it.
    #[inline(always)]
    pub fn claim(&mut self, slot: UsageSlot) -> bool {
        let cell = self.cell_mut(slot);
        let was_free = !*cell;
        *cell = true;
        was_free
    }

    pub fn buttons(&self) -> &[bool; BUTTON_COUNT] {
        &self.buttons
    }

    pub fn sensors(&self) -> &[bool; SENSOR_COUNT] {
        &self.sensors
    }

    pub fn any_used(&self) -> bool {
        self.buttons.iter().chain(self.sensors.iter()).any(|&used| used)
    }
}
