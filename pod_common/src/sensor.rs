//! Sensor keys and the per-cycle sensor snapshot.
//!
//! `SensorKey` is the closed set of readings the pod reports. The string
//! names are the labels used by the abort-range table and the data log, so
//! a typo in configuration fails at load time instead of silently never
//! matching a reading.

use core::fmt;
use core::str::FromStr;

macro_rules! sensor_keys {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Identifier of one sensor reading.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum SensorKey {
            $($variant),+
        }

        impl SensorKey {
            /// Every key, in declaration (and log) order.
            pub const ALL: &'static [SensorKey] = &[$(SensorKey::$variant),+];

            /// Number of distinct keys.
            pub const COUNT: usize = Self::ALL.len();

            /// Stable label.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(SensorKey::$variant => $name),+
                }
            }
        }

        impl FromStr for SensorKey {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(SensorKey::$variant),)+
                    _ => Err(format!("unknown sensor key: {s:?}")),
                }
            }
        }
    };
}

sensor_keys! {
    // CAN: battery management and motor controller
    BmsConn => "BMS_Conn",
    BmsCellTempLeader => "BMS_Cell_Temp_Leader",
    BmsCellVoltageLeader => "BMS_Cell_Voltage_Leader",
    BmsCellVoltageLaggard => "BMS_Cell_Voltage_Laggard",
    BmsPackVoltage => "BMS_Pack_Voltage",
    SdConn => "SD_Conn",
    SdTemp => "SD_Temp",
    SdHvCurrent => "SD_HV_Current",
    SdHvBusVoltage => "SD_HVBusData_BusVoltage",
    MotorSpeed => "Motor_Speed",
    MotorDistance => "Motor_Distance",
    // I2C: avionics
    LvBattTemp => "LVBatt_Temp",
    LvBattCurrent => "LVBatt_Current",
    LvBattVoltage => "LVBatt_Voltage",
    PvLeftTemp => "PV_Left_Temp",
    PvLeftPressure => "PV_Left_Pressure",
    PvRightTemp => "PV_Right_Temp",
    PvRightPressure => "PV_Right_Pressure",
    AmbientPressure => "Ambient_Pressure",
    Imu1X => "IMU1_X",
    Imu1Y => "IMU1_Y",
    Imu1Z => "IMU1_Z",
    Imu2X => "IMU2_X",
    Imu2Y => "IMU2_Y",
    Imu2Z => "IMU2_Z",
    Lidar => "LIDAR",
    BrakePressure => "Brake_Pressure",
    LstLeft => "LST_Left",
    LstRight => "LST_Right",
    // Flight computer health
    GuiConn => "GUI_Conn",
    RpiTemp => "RPi_Temp",
    RpiProcLoad => "RPi_Proc_Load",
    RpiMemLoad => "RPi_Mem_Load",
    RpiDiskSpace => "RPi_Disk_Space",
}

impl SensorKey {
    /// Dense index into a snapshot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cycle's worth of sensor readings.
///
/// `None` marks a reading that is absent or stale this cycle. The core never
/// waits for a missing value; it simply does not evaluate it. Non-finite
/// readings are stored as absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    values: [Option<f64>; SensorKey::COUNT],
}

impl SensorSnapshot {
    /// Snapshot with every reading absent.
    pub const fn empty() -> Self {
        Self {
            values: [None; SensorKey::COUNT],
        }
    }

    #[inline]
    pub fn get(&self, key: SensorKey) -> Option<f64> {
        self.values[key.index()]
    }

    /// Store `value`, or mark the reading absent if it is NaN or infinite.
    #[inline]
    pub fn set(&mut self, key: SensorKey, value: f64) {
        self.values[key.index()] = value.is_finite().then_some(value);
    }

    #[inline]
    pub fn clear(&mut self, key: SensorKey) {
        self.values[key.index()] = None;
    }

    /// Builder-style setter.
    pub fn with(mut self, key: SensorKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Present readings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorKey, f64)> + '_ {
        SensorKey::ALL
            .iter()
            .filter_map(|&key| self.get(key).map(|value| (key, value)))
    }

    /// Number of present readings.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<(SensorKey, f64)> for SensorSnapshot {
    fn from_iter<I: IntoIterator<Item = (SensorKey, f64)>>(iter: I) -> Self {
        let mut snapshot = Self::empty();
        for (key, value) in iter {
            snapshot.set(key, value);
        }
        snapshot
    }
}
