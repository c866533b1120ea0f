use std::str::FromStr;

use adb_bus::sim::HostScript;

/// One host-side bus action given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// `reset`
    Reset,
    /// `talk:ADDR:REG`
    Talk { address: u8, register: u8 },
    /// `listen:ADDR:REG:HEX` (payload as hex digits, e.g. `1234`)
    Listen {
        address: u8,
        register: u8,
        payload: Vec<u8>,
    },
    /// `flush:ADDR`
    Flush { address: u8 },
    /// `idle:MICROS`
    Idle { micros: u64 },
}

impl HostCommand {
    pub fn append_to(&self, script: HostScript) -> HostScript {
        match self {
            HostCommand::Reset => script.reset(),
            HostCommand::Talk { address, register } => script.talk(*address, *register),
            HostCommand::Listen {
                address,
                register,
                payload,
            } => script.listen(*address, *register, payload),
            HostCommand::Flush { address } => script.flush(*address),
            HostCommand::Idle { micros } => script.high_us(*micros),
        }
    }
}

impl FromStr for HostCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            ["reset"] => Ok(HostCommand::Reset),
            ["talk", addr, reg] => Ok(HostCommand::Talk {
                address: parse_address(addr)?,
                register: parse_register(reg)?,
            }),
            ["listen", addr, reg, data] => Ok(HostCommand::Listen {
                address: parse_address(addr)?,
                register: parse_register(reg)?,
                payload: parse_hex_bytes(data)?,
            }),
            ["flush", addr] => Ok(HostCommand::Flush {
                address: parse_address(addr)?,
            }),
            ["idle", us] => Ok(HostCommand::Idle {
                micros: us.parse().map_err(|e| format!("bad idle time {us:?}: {e}"))?,
            }),
            _ => Err(format!(
                "unknown host command {s:?} (expected reset, talk:A:R, listen:A:R:HEX, flush:A or idle:US)"
            )),
        }
    }
}

/// Decimal, or hex with a `0x` prefix.
pub fn parse_u8(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("bad number {s:?}: {e}"))
}

fn parse_address(s: &str) -> Result<u8, String> {
    let address = parse_u8(s)?;
    if address > 0x0F {
        return Err(format!("address {address} does not fit in 4 bits"));
    }
    Ok(address)
}

fn parse_register(s: &str) -> Result<u8, String> {
    let register = parse_u8(s)?;
    if register > 3 {
        return Err(format!("register {register} is not 0..=3"));
    }
    Ok(register)
}

/// Hex digits, optionally separated by spaces or commas: `"41 54"`, `"4154"`, `"41,54"`.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {s:?}"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("bad hex byte {:?}: {e}", &digits[i..i + 2]))
        })
        .collect()
}
