//! Representative catalog entries.
//!
//! Request tags have bit 23 clear, response tags have it set
//! (`0x03000001` requests what `0x03800001` answers). The full device catalog
//! is data rather than code; register additional entries with
//! [`StaticCatalog::insert`](crate::tag::StaticCatalog::insert).

use crate::tag::{Namespace, TagDef};
use crate::types::DataType;

macro_rules! tag {
    ($name:ident, $ns:ident, $code:expr, $ty:ident) => {
        pub const $name: TagDef =
            TagDef::new(Namespace::$ns, $code, DataType::$ty, stringify!($name));
    };
}

// RSCP
tag!(RSCP_REQ_AUTHENTICATION, Rscp, 0x0000_0001, Container);
tag!(RSCP_AUTHENTICATION_USER, Rscp, 0x0000_0002, String);
tag!(RSCP_AUTHENTICATION_PASSWORD, Rscp, 0x0000_0003, String);
tag!(RSCP_AUTHENTICATION, Rscp, 0x0080_0001, UChar8);
tag!(RSCP_GENERAL_ERROR, Rscp, 0x00FF_FFFF, Error);

// EMS
tag!(EMS_REQ_POWER_PV, Ems, 0x0100_0001, None);
tag!(EMS_REQ_POWER_BAT, Ems, 0x0100_0002, None);
tag!(EMS_REQ_POWER_HOME, Ems, 0x0100_0003, None);
tag!(EMS_REQ_POWER_GRID, Ems, 0x0100_0004, None);
tag!(EMS_REQ_BAT_SOC, Ems, 0x0100_0008, None);
tag!(EMS_REQ_SET_POWER_SETTINGS, Ems, 0x0100_0041, Container);
tag!(EMS_MAX_CHARGE_POWER, Ems, 0x0100_0042, UInt32);
tag!(EMS_POWER_PV, Ems, 0x0180_0001, Int32);
tag!(EMS_POWER_BAT, Ems, 0x0180_0002, Int32);
tag!(EMS_POWER_HOME, Ems, 0x0180_0003, Int32);
tag!(EMS_POWER_GRID, Ems, 0x0180_0004, Int32);
tag!(EMS_BAT_SOC, Ems, 0x0180_0008, UChar8);
tag!(EMS_SET_POWER_SETTINGS, Ems, 0x0180_0041, Container);
tag!(EMS_RES_MAX_CHARGE_POWER, Ems, 0x0180_0042, Char8);

// PVI
tag!(PVI_REQ_DATA, Pvi, 0x0204_0000, Container);
tag!(PVI_INDEX, Pvi, 0x0204_0001, UInt16);
tag!(PVI_DATA, Pvi, 0x0284_0000, Container);
tag!(PVI_ON_GRID, Pvi, 0x0280_0001, Bool);

// BAT
tag!(BAT_REQ_RSOC, Bat, 0x0300_0001, None);
tag!(BAT_REQ_DATA, Bat, 0x0304_0000, Container);
tag!(BAT_INDEX, Bat, 0x0304_0001, UInt16);
tag!(BAT_RSOC, Bat, 0x0380_0001, Float32);
tag!(BAT_MODULE_VOLTAGE, Bat, 0x0380_0002, Float32);
tag!(BAT_CURRENT, Bat, 0x0380_0003, Float32);
tag!(BAT_CHARGE_CYCLES, Bat, 0x0380_0006, UInt32);
tag!(BAT_DATA, Bat, 0x0384_0000, Container);
tag!(BAT_DCB_INFO, Bat, 0x0384_2000, Container);
tag!(BAT_DCB_INDEX, Bat, 0x0384_2001, UInt16);
tag!(BAT_DCB_CYCLE_COUNT, Bat, 0x0380_2002, UInt32);

// DCDC
tag!(DCDC_REQ_DATA, Dcdc, 0x0404_0000, Container);
tag!(DCDC_DATA, Dcdc, 0x0484_0000, Container);

// PM
tag!(PM_REQ_DATA, Pm, 0x0504_0000, Container);
tag!(PM_INDEX, Pm, 0x0504_0001, UChar8);
tag!(PM_DATA, Pm, 0x0584_0000, Container);
tag!(PM_POWER_L1, Pm, 0x0580_0001, Double64);

// DB
tag!(DB_REQ_HISTORY_DATA_DAY, Db, 0x0610_0000, Container);
tag!(DB_REQ_HISTORY_TIME_START, Db, 0x0610_0001, Timestamp);
tag!(DB_REQ_HISTORY_TIME_INTERVAL, Db, 0x0610_0002, Timestamp);
tag!(DB_REQ_HISTORY_TIME_SPAN, Db, 0x0610_0003, Timestamp);
tag!(DB_HISTORY_DATA_DAY, Db, 0x0690_0000, Container);

// FMS, SRV, HA
tag!(FMS_REQ_DATA, Fms, 0x0704_0000, Container);
tag!(SRV_REQ_IS_ONLINE, Srv, 0x0800_0001, None);
tag!(SRV_IS_ONLINE, Srv, 0x0880_0001, Bool);
tag!(HA_REQ_DATAPOINT_LIST, Ha, 0x0900_0001, None);

// INFO
tag!(INFO_REQ_SERIAL_NUMBER, Info, 0x0A00_0001, None);
tag!(INFO_REQ_TIME, Info, 0x0A00_000F, None);
tag!(INFO_SERIAL_NUMBER, Info, 0x0A80_0001, String);
tag!(INFO_TIME, Info, 0x0A80_000F, Timestamp);
tag!(INFO_UTC_TIME, Info, 0x0A80_0010, Timestamp);

// EP, SYS, UM, WB
tag!(EP_REQ_IS_GRID_CONNECTED, Ep, 0x0B00_0003, None);
tag!(EP_IS_GRID_CONNECTED, Ep, 0x0B80_0003, Bool);
tag!(SYS_REQ_SYSTEM_REBOOT, Sys, 0x0C00_0001, None);
tag!(SYS_SYSTEM_REBOOT, Sys, 0x0C80_0001, UChar8);
tag!(UM_REQ_UPDATE_STATUS, Um, 0x0D00_0001, None);
tag!(UM_UPDATE_STATUS, Um, 0x0D80_0001, UChar8);
tag!(WB_REQ_DATA, Wb, 0x0E04_0000, Container);
tag!(WB_INDEX, Wb, 0x0E04_0001, UChar8);
tag!(WB_DATA, Wb, 0x0E84_0000, Container);
tag!(WB_EXTERN_DATA, Wb, 0x0E80_0011, ByteArray);

/// Every entry defined in this module.
pub const ALL: &[TagDef] = &[
    RSCP_REQ_AUTHENTICATION,
    RSCP_AUTHENTICATION_USER,
    RSCP_AUTHENTICATION_PASSWORD,
    RSCP_AUTHENTICATION,
    RSCP_GENERAL_ERROR,
    EMS_REQ_POWER_PV,
    EMS_REQ_POWER_BAT,
    EMS_REQ_POWER_HOME,
    EMS_REQ_POWER_GRID,
    EMS_REQ_BAT_SOC,
    EMS_REQ_SET_POWER_SETTINGS,
    EMS_MAX_CHARGE_POWER,
    EMS_POWER_PV,
    EMS_POWER_BAT,
    EMS_POWER_HOME,
    EMS_POWER_GRID,
    EMS_BAT_SOC,
    EMS_SET_POWER_SETTINGS,
    EMS_RES_MAX_CHARGE_POWER,
    PVI_REQ_DATA,
    PVI_INDEX,
    PVI_DATA,
    PVI_ON_GRID,
    BAT_REQ_RSOC,
    BAT_REQ_DATA,
    BAT_INDEX,
    BAT_RSOC,
    BAT_MODULE_VOLTAGE,
    BAT_CURRENT,
    BAT_CHARGE_CYCLES,
    BAT_DATA,
    BAT_DCB_INFO,
    BAT_DCB_INDEX,
    BAT_DCB_CYCLE_COUNT,
    DCDC_REQ_DATA,
    DCDC_DATA,
    PM_REQ_DATA,
    PM_INDEX,
    PM_DATA,
    PM_POWER_L1,
    DB_REQ_HISTORY_DATA_DAY,
    DB_REQ_HISTORY_TIME_START,
    DB_REQ_HISTORY_TIME_INTERVAL,
    DB_REQ_HISTORY_TIME_SPAN,
    DB_HISTORY_DATA_DAY,
    FMS_REQ_DATA,
    SRV_REQ_IS_ONLINE,
    SRV_IS_ONLINE,
    HA_REQ_DATAPOINT_LIST,
    INFO_REQ_SERIAL_NUMBER,
    INFO_REQ_TIME,
    INFO_SERIAL_NUMBER,
    INFO_TIME,
    INFO_UTC_TIME,
    EP_REQ_IS_GRID_CONNECTED,
    EP_IS_GRID_CONNECTED,
    SYS_REQ_SYSTEM_REBOOT,
    SYS_SYSTEM_REBOOT,
    UM_REQ_UPDATE_STATUS,
    UM_UPDATE_STATUS,
    WB_REQ_DATA,
    WB_INDEX,
    WB_DATA,
    WB_EXTERN_DATA,
];
