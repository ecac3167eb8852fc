use crate::converters::UnknownValue;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Subunit ids
pub const SUBUNIT_SYS: &str = "SYS";
pub const SUBUNIT_MAIN: &str = "MAIN";
pub const SUBUNIT_ZONE2: &str = "ZONE2";
pub const SUBUNIT_ZONE3: &str = "ZONE3";
pub const SUBUNIT_ZONE4: &str = "ZONE4";

/// Function that marks the end of initialization data when requested last
pub const SENTINEL_FUNCTION: &str = "VERSION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Avail {
    #[strum(serialize = "Ready")]
    Ready,
    #[strum(serialize = "Not Ready")]
    NotReady,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl UnknownValue for Avail {
    const UNKNOWN: Self = Avail::Unknown;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Pwr {
    #[strum(serialize = "On")]
    On,
    #[strum(serialize = "Standby")]
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Mute {
    #[strum(serialize = "On")]
    On,
    #[strum(serialize = "Att -20 dB")]
    AttMinus20,
    #[strum(serialize = "Att -40 dB")]
    AttMinus40,
    #[strum(serialize = "Off")]
    Off,
}

/// Fixed settings for the power-on volume; any other value is a level in dB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum InitVolLvl {
    #[strum(serialize = "Mute")]
    Mute,
    #[strum(serialize = "Off")]
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Sleep {
    #[strum(serialize = "Off")]
    Off,
    #[strum(serialize = "30 min")]
    Min30,
    #[strum(serialize = "60 min")]
    Min60,
    #[strum(serialize = "90 min")]
    Min90,
    #[strum(serialize = "120 min")]
    Min120,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Straight {
    #[strum(serialize = "On")]
    On,
    #[strum(serialize = "Off")]
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum PureDirMode {
    #[strum(serialize = "On")]
    On,
    #[strum(serialize = "Off")]
    Off,
}

/// Input sources; the list differs per model and region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Input {
    #[strum(serialize = "AirPlay")]
    AirPlay,
    #[strum(serialize = "AUDIO1")]
    Audio1,
    #[strum(serialize = "AUDIO2")]
    Audio2,
    #[strum(serialize = "AUDIO3")]
    Audio3,
    #[strum(serialize = "AUDIO4")]
    Audio4,
    #[strum(serialize = "AV1")]
    Av1,
    #[strum(serialize = "AV2")]
    Av2,
    #[strum(serialize = "AV3")]
    Av3,
    #[strum(serialize = "AV4")]
    Av4,
    #[strum(serialize = "AV5")]
    Av5,
    #[strum(serialize = "AV6")]
    Av6,
    #[strum(serialize = "AV7")]
    Av7,
    #[strum(serialize = "Bluetooth")]
    Bluetooth,
    #[strum(serialize = "DOCK")]
    Dock,
    #[strum(serialize = "HDMI1")]
    Hdmi1,
    #[strum(serialize = "HDMI2")]
    Hdmi2,
    #[strum(serialize = "HDMI3")]
    Hdmi3,
    #[strum(serialize = "HDMI4")]
    Hdmi4,
    #[strum(serialize = "HDMI5")]
    Hdmi5,
    #[strum(serialize = "HDMI6")]
    Hdmi6,
    #[strum(serialize = "HDMI7")]
    Hdmi7,
    #[strum(serialize = "iPod")]
    Ipod,
    #[strum(serialize = "iPod (USB)")]
    IpodUsb,
    #[strum(serialize = "MULTI CH")]
    MultiCh,
    #[strum(serialize = "Napster")]
    Napster,
    #[strum(serialize = "NET RADIO")]
    NetRadio,
    #[strum(serialize = "Pandora")]
    Pandora,
    #[strum(serialize = "PC")]
    Pc,
    #[strum(serialize = "PHONO")]
    Phono,
    #[strum(serialize = "Rhapsody")]
    Rhapsody,
    #[strum(serialize = "SERVER")]
    Server,
    #[strum(serialize = "SiriusXM")]
    SiriusXm,
    #[strum(serialize = "Spotify")]
    Spotify,
    #[strum(serialize = "TUNER")]
    Tuner,
    #[strum(serialize = "USB")]
    Usb,
    #[strum(serialize = "V-AUX")]
    VAux,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl UnknownValue for Input {
    const UNKNOWN: Self = Input::Unknown;
}

/// DSP sound programs; the list differs per model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum SoundPrg {
    #[strum(serialize = "Hall in Munich")]
    HallInMunich,
    #[strum(serialize = "Hall in Vienna")]
    HallInVienna,
    #[strum(serialize = "Chamber")]
    Chamber,
    #[strum(serialize = "Cellar Club")]
    CellarClub,
    #[strum(serialize = "The Roxy Theatre")]
    TheRoxyTheatre,
    #[strum(serialize = "The Bottom Line")]
    TheBottomLine,
    #[strum(serialize = "Sports")]
    Sports,
    #[strum(serialize = "Action Game")]
    ActionGame,
    #[strum(serialize = "Roleplaying Game")]
    RoleplayingGame,
    #[strum(serialize = "Music Video")]
    MusicVideo,
    #[strum(serialize = "Standard")]
    Standard,
    #[strum(serialize = "Spectacle")]
    Spectacle,
    #[strum(serialize = "Sci-Fi")]
    SciFi,
    #[strum(serialize = "Adventure")]
    Adventure,
    #[strum(serialize = "Drama")]
    Drama,
    #[strum(serialize = "Mono Movie")]
    MonoMovie,
    #[strum(serialize = "2ch Stereo")]
    TwoChStereo,
    #[strum(serialize = "7ch Stereo")]
    SevenChStereo,
    #[strum(serialize = "9ch Stereo")]
    NineChStereo,
    #[strum(serialize = "Surround Decoder")]
    SurroundDecoder,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl UnknownValue for SoundPrg {
    const UNKNOWN: Self = SoundPrg::Unknown;
}

/// Decoder used for 2-channel sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum TwoChDecoder {
    #[strum(serialize = "Dolby PL")]
    DolbyPl,
    #[strum(serialize = "Dolby PLII Game")]
    DolbyPl2Game,
    #[strum(serialize = "Dolby PLII Movie")]
    DolbyPl2Movie,
    #[strum(serialize = "Dolby PLII Music")]
    DolbyPl2Music,
    #[strum(serialize = "Dolby PLIIx Game")]
    DolbyPl2xGame,
    #[strum(serialize = "Dolby PLIIx Movie")]
    DolbyPl2xMovie,
    #[strum(serialize = "Dolby PLIIx Music")]
    DolbyPl2xMusic,
    #[strum(serialize = "DTS NEO:6 Cinema")]
    DtsNeo6Cinema,
    #[strum(serialize = "DTS NEO:6 Music")]
    DtsNeo6Music,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl UnknownValue for TwoChDecoder {
    const UNKNOWN: Self = TwoChDecoder::Unknown;
}
