//! The SYS subunit.

use crate::connection::Connection;
use crate::constants::{Pwr, SUBUNIT_SYS};
use crate::converters::{decode_enum, decode_str, encode_enum, encode_str};
use crate::error::Result;
use crate::function::{any_key, Access, Converter, Function, FunctionFamily, Init};
use crate::subunit::{Subunit, SubunitKind};
use std::collections::BTreeMap;
use std::sync::Arc;

pub static MODELNAME: Function<String> = Function::new(
    "MODELNAME",
    Access::Read,
    Init::Own,
    Converter::new(decode_str, encode_str),
);

/// Firmware version
pub static VERSION: Function<String> = Function::new(
    "VERSION",
    Access::Read,
    Init::Own,
    Converter::new(decode_str, encode_str),
);

/// Power of the whole device
pub static PWR: Function<Pwr> = Function::new(
    "PWR",
    Access::ReadWrite,
    Init::Own,
    Converter::new(decode_enum::<Pwr>, encode_enum::<Pwr>),
);

/// `INPNAME<input>`, the user-visible name of each input
pub static INPUT_NAME: FunctionFamily<String> = FunctionFamily::new(
    "INPNAME",
    "",
    Init::Group("INPNAME"),
    any_key,
    Converter::new(decode_str, encode_str),
);

/// SYS has no AVAIL function; it is always present
pub static SYSTEM: SubunitKind = SubunitKind {
    functions: &[&MODELNAME, &VERSION, &PWR, &INPUT_NAME],
    requires_avail: false,
};

pub struct System {
    subunit: Subunit,
}

impl System {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self {
            subunit: Subunit::new(SUBUNIT_SYS, &SYSTEM, connection),
        }
    }

    pub fn subunit(&self) -> &Subunit {
        &self.subunit
    }

    pub async fn initialize(&self) -> Result<()> {
        self.subunit.initialize().await
    }

    pub fn modelname(&self) -> Option<String> {
        self.subunit.get(&MODELNAME)
    }

    pub fn version(&self) -> Option<String> {
        self.subunit.get(&VERSION)
    }

    pub fn pwr(&self) -> Option<Pwr> {
        self.subunit.get(&PWR)
    }

    pub fn set_pwr(&self, value: Pwr) -> Result<()> {
        self.subunit.set(&PWR, &value)
    }

    /// Name of an input, keyed by its wire id (e.g. `HDMI1`)
    pub fn input_name(&self, input: &str) -> Option<String> {
        self.subunit.get_indexed(&INPUT_NAME, input)
    }

    pub fn input_names(&self) -> BTreeMap<String, String> {
        self.subunit.entries(&INPUT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Descriptor;

    #[test]
    fn input_name_family() {
        assert_eq!(INPUT_NAME.key("INPNAMEHDMI1"), Some("HDMI1"));
        assert_eq!(INPUT_NAME.key("INPNAME"), None);
        assert_eq!(INPUT_NAME.wire_name("AV2"), "INPNAMEAV2");
    }

    #[test]
    fn modelname_is_read_only() {
        assert!(MODELNAME.encode(&"RX-V".to_string()).is_err());
        assert!(!MODELNAME.accepts("VERSION"));
    }

    #[test]
    fn sys_skips_sentinel_in_init_queries() {
        let system = System::new(Arc::new(Connection::new("test")));
        assert_eq!(
            system.subunit.init_queries(),
            vec!["MODELNAME", "PWR", "INPNAME"]
        );
    }
}
