//! Zone subunits (MAIN, ZONE2, ZONE3, ZONE4).

use crate::connection::Connection;
use crate::constants::{
    InitVolLvl, Input, Mute, PureDirMode, Pwr, Sleep, SoundPrg, Straight, TwoChDecoder,
    SUBUNIT_MAIN, SUBUNIT_ZONE2, SUBUNIT_ZONE3, SUBUNIT_ZONE4,
};
use crate::converters::{
    decode_either, decode_enum, decode_enum_or_unknown, decode_float, decode_str,
    encode_bounded_str, encode_either, encode_enum, encode_known_enum, encode_str,
    encode_volume, volume_step, Either, EnumFormat, VolumeFormat,
};
use crate::error::Result;
use crate::function::{numeric_key, Access, Converter, Function, FunctionFamily, Init};
use crate::subunit::{Subunit, SubunitKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Longest zone name the device accepts
pub const ZONENAME_MAX_LEN: usize = 9;

const BASIC: Init = Init::Group("BASIC");

pub static PWR: Function<Pwr> = Function::new(
    "PWR",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum::<Pwr>, encode_enum::<Pwr>),
);

pub static SLEEP: Function<Sleep> = Function::new(
    "SLEEP",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum::<Sleep>, encode_enum::<Sleep>),
);

/// Volume in dB
pub static VOL: Function<f64> = Function::new(
    "VOL",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_float, encode_volume),
);

pub static MAXVOL: Function<f64> = Function::new(
    "MAXVOL",
    Access::ReadWrite,
    Init::Own,
    Converter::new(decode_float, encode_volume),
);

/// Volume at power on: a fixed setting or a level in dB
pub static INITVOLLVL: Function<Either<InitVolLvl, f64>> = Function::new(
    "INITVOLLVL",
    Access::ReadWrite,
    Init::Own,
    Converter::new(
        decode_either::<EnumFormat<InitVolLvl>, VolumeFormat>,
        encode_either::<EnumFormat<InitVolLvl>, VolumeFormat>,
    ),
);

pub static MUTE: Function<Mute> = Function::new(
    "MUTE",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum::<Mute>, encode_enum::<Mute>),
);

pub static INP: Function<Input> = Function::new(
    "INP",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum_or_unknown::<Input>, encode_known_enum::<Input>),
);

pub static STRAIGHT: Function<Straight> = Function::new(
    "STRAIGHT",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum::<Straight>, encode_enum::<Straight>),
);

pub static SOUNDPRG: Function<SoundPrg> = Function::new(
    "SOUNDPRG",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum_or_unknown::<SoundPrg>, encode_known_enum::<SoundPrg>),
);

pub static PUREDIRMODE: Function<PureDirMode> = Function::new(
    "PUREDIRMODE",
    Access::ReadWrite,
    BASIC,
    Converter::new(decode_enum::<PureDirMode>, encode_enum::<PureDirMode>),
);

pub static TWOCHDECODER: Function<TwoChDecoder> = Function::new(
    "2CHDECODER",
    Access::ReadWrite,
    Init::Own,
    Converter::new(
        decode_enum_or_unknown::<TwoChDecoder>,
        encode_known_enum::<TwoChDecoder>,
    ),
);

pub static ZONENAME: Function<String> = Function::new(
    "ZONENAME",
    Access::ReadWrite,
    Init::Own,
    Converter::new(decode_str, encode_bounded_str::<0, ZONENAME_MAX_LEN>),
);

/// `SCENE<n>NAME`, one per scene the device has
pub static SCENE_NAME: FunctionFamily<String> = FunctionFamily::new(
    "SCENE",
    "NAME",
    Init::Group("SCENENAME"),
    numeric_key,
    Converter::new(decode_str, encode_str),
);

/// Write-only function used to recall scenes
const SCENE: &str = "SCENE";

pub static ZONE: SubunitKind = SubunitKind {
    functions: &[
        &PWR,
        &SLEEP,
        &VOL,
        &MAXVOL,
        &INITVOLLVL,
        &MUTE,
        &INP,
        &STRAIGHT,
        &SOUNDPRG,
        &PUREDIRMODE,
        &TWOCHDECODER,
        &ZONENAME,
        &SCENE_NAME,
    ],
    requires_avail: true,
};

/// A zone of the receiver
pub struct Zone {
    subunit: Subunit,
}

impl Zone {
    pub fn new(id: impl Into<String>, connection: Arc<Connection>) -> Self {
        Self {
            subunit: Subunit::new(id, &ZONE, connection),
        }
    }

    pub fn main(connection: Arc<Connection>) -> Self {
        Self::new(SUBUNIT_MAIN, connection)
    }

    pub fn zone2(connection: Arc<Connection>) -> Self {
        Self::new(SUBUNIT_ZONE2, connection)
    }

    pub fn zone3(connection: Arc<Connection>) -> Self {
        Self::new(SUBUNIT_ZONE3, connection)
    }

    pub fn zone4(connection: Arc<Connection>) -> Self {
        Self::new(SUBUNIT_ZONE4, connection)
    }

    /// The underlying subunit, for generic `get`/`set` and callbacks
    pub fn subunit(&self) -> &Subunit {
        &self.subunit
    }

    pub async fn initialize(&self) -> Result<()> {
        self.subunit.initialize().await
    }

    pub fn pwr(&self) -> Option<Pwr> {
        self.subunit.get(&PWR)
    }

    pub fn set_pwr(&self, value: Pwr) -> Result<()> {
        self.subunit.set(&PWR, &value)
    }

    pub fn sleep(&self) -> Option<Sleep> {
        self.subunit.get(&SLEEP)
    }

    pub fn set_sleep(&self, value: Sleep) -> Result<()> {
        self.subunit.set(&SLEEP, &value)
    }

    pub fn vol(&self) -> Option<f64> {
        self.subunit.get(&VOL)
    }

    /// Set the volume, rounded to the nearest 0.5 dB
    pub fn set_vol(&self, db: f64) -> Result<()> {
        self.subunit.set(&VOL, &db)
    }

    /// Raise the volume by `step_db` (1, 2 or 5 dB) or by the device's
    /// default step for any other value
    pub fn vol_up(&self, step_db: Option<u32>) -> Result<()> {
        self.subunit.put(VOL.name, &volume_step(true, step_db))
    }

    pub fn vol_down(&self, step_db: Option<u32>) -> Result<()> {
        self.subunit.put(VOL.name, &volume_step(false, step_db))
    }

    pub fn maxvol(&self) -> Option<f64> {
        self.subunit.get(&MAXVOL)
    }

    pub fn initvollvl(&self) -> Option<Either<InitVolLvl, f64>> {
        self.subunit.get(&INITVOLLVL)
    }

    /// Volume at power on; levels are rounded to the nearest 0.5 dB
    pub fn set_initvollvl(&self, value: Either<InitVolLvl, f64>) -> Result<()> {
        self.subunit.set(&INITVOLLVL, &value)
    }

    pub fn mute(&self) -> Option<Mute> {
        self.subunit.get(&MUTE)
    }

    pub fn set_mute(&self, value: Mute) -> Result<()> {
        self.subunit.set(&MUTE, &value)
    }

    pub fn inp(&self) -> Option<Input> {
        self.subunit.get(&INP)
    }

    pub fn set_inp(&self, value: Input) -> Result<()> {
        self.subunit.set(&INP, &value)
    }

    pub fn straight(&self) -> Option<Straight> {
        self.subunit.get(&STRAIGHT)
    }

    pub fn set_straight(&self, value: Straight) -> Result<()> {
        self.subunit.set(&STRAIGHT, &value)
    }

    pub fn soundprg(&self) -> Option<SoundPrg> {
        self.subunit.get(&SOUNDPRG)
    }

    pub fn set_soundprg(&self, value: SoundPrg) -> Result<()> {
        self.subunit.set(&SOUNDPRG, &value)
    }

    pub fn puredirmode(&self) -> Option<PureDirMode> {
        self.subunit.get(&PUREDIRMODE)
    }

    pub fn set_puredirmode(&self, value: PureDirMode) -> Result<()> {
        self.subunit.set(&PUREDIRMODE, &value)
    }

    pub fn twochdecoder(&self) -> Option<TwoChDecoder> {
        self.subunit.get(&TWOCHDECODER)
    }

    pub fn set_twochdecoder(&self, value: TwoChDecoder) -> Result<()> {
        self.subunit.set(&TWOCHDECODER, &value)
    }

    pub fn zonename(&self) -> Option<String> {
        self.subunit.get(&ZONENAME)
    }

    /// Fails without sending anything if the name is too long
    pub fn set_zonename(&self, name: impl Into<String>) -> Result<()> {
        self.subunit.set(&ZONENAME, &name.into())
    }

    pub fn scene_name(&self, scene: u32) -> Option<String> {
        self.subunit.get_indexed(&SCENE_NAME, &scene.to_string())
    }

    /// Names of the scenes the device reported, by scene number
    pub fn scene_names(&self) -> BTreeMap<u32, String> {
        self.subunit
            .entries(&SCENE_NAME)
            .into_iter()
            .filter_map(|(key, name)| Some((key.parse::<u32>().ok()?, name)))
            .collect()
    }

    pub fn scene_recall(&self, scene: u32) -> Result<()> {
        self.subunit.put(SCENE, &format!("Scene {scene}"))
    }
}
