/* ------------------------------ Sensor areas ------------------------------ */

pub const BUTTON_COUNT: usize = 8;
pub const SENSOR_COUNT: usize = 33;
pub const LANE_COUNT: usize = 8;
pub const AREA_COUNT: usize = 37;

/// Physical input areas, ordered by their hardware ordinal.
///
/// A1..A8 double as the eight cabinet buttons. Everything after `E8` is a
/// reserved id that the gameplay path never processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SensorArea {
    A1 = 0,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    C,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    E1,
    E2,
    E3,
    E4,
    E5,
    E6,
    E7,
    E8,
    Test,
    P1,
    Service,
    P2,
}

impl SensorArea {
    pub const FIRST: Self = Self::A1;
    pub const LAST_PLAYABLE: Self = Self::E8;

    const ALL: [Self; AREA_COUNT] = [
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
        Self::A7,
        Self::A8,
        Self::B1,
        Self::B2,
        Self::B3,
        Self::B4,
        Self::B5,
        Self::B6,
        Self::B7,
        Self::B8,
        Self::C,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
        Self::D8,
        Self::E1,
        Self::E2,
        Self::E3,
        Self::E4,
        Self::E5,
        Self::E6,
        Self::E7,
        Self::E8,
        Self::Test,
        Self::P1,
        Self::Service,
        Self::P2,
    ];

    #[inline(always)]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        let ix = ordinal as usize;
        if ix < Self::ALL.len() {
            Some(Self::ALL[ix])
        } else {
            None
        }
    }

    /// True for A1..=E8, the only areas the gameplay path accepts.
    #[inline(always)]
    pub const fn is_playable(self) -> bool {
        self.ordinal() <= Self::LAST_PLAYABLE.ordinal()
    }

    #[inline(always)]
    pub const fn is_button_area(self) -> bool {
        self.index() < BUTTON_COUNT
    }

    /// Tap lane (1..=8) driven by this area's button, if it has one.
    #[inline(always)]
    pub const fn button_lane(self) -> Option<u8> {
        if self.is_button_area() {
            Some(self.ordinal() + 1)
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn from_lane(lane: u8) -> Option<Self> {
        if lane >= 1 && lane as usize <= LANE_COUNT {
            Self::from_ordinal(lane - 1)
        } else {
            None
        }
    }

    /// All playable touch areas in ordinal order.
    pub fn playable() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().take(SENSOR_COUNT)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::A6 => "A6",
            Self::A7 => "A7",
            Self::A8 => "A8",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::B3 => "B3",
            Self::B4 => "B4",
            Self::B5 => "B5",
            Self::B6 => "B6",
            Self::B7 => "B7",
            Self::B8 => "B8",
            Self::C => "C",
            Self::D1 => "D1",
            Self::D2 => "D2",
            Self::D3 => "D3",
            Self::D4 => "D4",
            Self::D5 => "D5",
            Self::D6 => "D6",
            Self::D7 => "D7",
            Self::D8 => "D8",
            Self::E1 => "E1",
            Self::E2 => "E2",
            Self::E3 => "E3",
            Self::E4 => "E4",
            Self::E5 => "E5",
            Self::E6 => "E6",
            Self::E7 => "E7",
            Self::E8 => "E8",
            Self::Test => "Test",
            Self::P1 => "P1",
            Self::Service => "Service",
            Self::P2 => "P2",
        }
    }
}

impl std::fmt::Display for SensorArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SensorStatus {
    #[default]
    Off,
    On,
}

impl SensorStatus {
    #[inline(always)]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    #[inline(always)]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed { Self::On } else { Self::Off }
    }
}
