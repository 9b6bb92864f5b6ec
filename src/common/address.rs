use crate::common::defs::MASK;
use core::ops::RangeInclusive;
use core::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AddressError {
    NotShort,
    NotGroup,
    InvalidAddress,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match self {
            AddressError::NotShort => write!(fmt, "Not a short address"),
            AddressError::NotGroup => write!(fmt, "Not a group address"),
            AddressError::InvalidAddress => write!(fmt, "InvalidAddress"),
        }
    }
}

impl std::error::Error for AddressError {}

/// First byte of a forward frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressByte(pub u8);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Short(u8);

impl Short {
    pub fn new(a: u8) -> Result<Short, AddressError> {
        if a < 64 {
            Ok(Short(a))
        } else {
            Err(AddressError::NotShort)
        }
    }

    /// Decode a stored short address, `MASK` meaning no address
    pub fn from_stored(a: u8) -> Option<Short> {
        Short::new(a).ok()
    }

    /// Decode the `0AAAAAA1` form used by PROGRAM SHORT ADDRESS and
    /// STORE DTR AS SHORT ADDRESS. `Ok(None)` is the MASK value.
    pub fn from_program_byte(b: u8) -> Result<Option<Short>, AddressError> {
        if b == MASK {
            Ok(None)
        } else if b & 0x81 == 0x01 {
            Ok(Some(Short(b >> 1)))
        } else {
            Err(AddressError::InvalidAddress)
        }
    }

    /// Address 0..64
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Short {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(fmt)
    }
}

impl FromStr for Short {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u8::from_str(s).map_or(Err(AddressError::InvalidAddress), Short::new)
    }
}

impl From<Short> for AddressByte {
    fn from(short: Short) -> Self {
        AddressByte((short.0 << 1) | 1)
    }
}

impl From<Option<Short>> for AddressByte {
    fn from(short_or_mask: Option<Short>) -> AddressByte {
        if let Some(addr) = short_or_mask {
            AddressByte::from(addr)
        } else {
            AddressByte(MASK)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Group(u8);

impl Group {
    const RANGE: RangeInclusive<u8> = 0..=15;

    pub fn new(a: u8) -> Result<Group, AddressError> {
        if Self::RANGE.contains(&a) {
            Ok(Group(a))
        } else {
            Err(AddressError::NotGroup)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Bit in the group membership word
    pub fn mask(&self) -> u16 {
        1 << self.0
    }
}

impl From<Group> for AddressByte {
    fn from(group: Group) -> AddressByte {
        AddressByte((group.0 << 1) | 0x81)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Address {
    Short(Short),
    Group(Group),
    Broadcast,
}

impl Address {
    pub fn from_bus_address(bus: u8) -> Result<Address, AddressError> {
        match bus >> 1 {
            a @ 0..=0x3f => Ok(Address::Short(Short(a))),
            a @ 0x40..=0x4f => Ok(Address::Group(Group(a & 0x0f))),
            0x7f => Ok(Address::Broadcast),
            _ => Err(AddressError::InvalidAddress),
        }
    }
}

impl From<Short> for Address {
    fn from(a: Short) -> Self {
        Address::Short(a)
    }
}

impl From<Group> for Address {
    fn from(a: Group) -> Self {
        Address::Group(a)
    }
}

impl From<Address> for AddressByte {
    fn from(addr: Address) -> AddressByte {
        match addr {
            Address::Short(a) => a.into(),
            Address::Group(a) => a.into(),
            Address::Broadcast => AddressByte(0xff),
        }
    }
}

/// What a received forward frame asks for
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameClass {
    /// Direct arc power
    ArcPower { target: Address, level: u8 },
    /// Indirect command, index into the normal table
    Command { target: Address, opcode: u8 },
    /// Special command, index into the special table
    Special { index: u8, data: u8 },
    /// Special commands with the second sub type, index into the extended table
    Extended { index: u8, data: u8 },
    /// Reserved frame
    Ignored,
}

const SPECIAL_RANGE: RangeInclusive<u8> = 0xa1..=0xe0;

/// Classify a forward frame.
///
/// The predicates are tried in order and the first match decides.
pub fn classify(frame: [u8; 2]) -> FrameClass {
    let [addr, data] = frame;
    if SPECIAL_RANGE.contains(&addr) && addr & 1 == 1 {
        let bus = (addr >> 1) & 0x3f;
        let index = bus & 0x0f;
        return match bus >> 4 {
            1 => FrameClass::Special { index, data },
            2 => FrameClass::Extended { index, data },
            _ => FrameClass::Ignored,
        };
    }
    let Ok(target) = Address::from_bus_address(addr) else {
        return FrameClass::Ignored;
    };
    if addr & 1 == 0 {
        FrameClass::ArcPower {
            target,
            level: data,
        }
    } else {
        FrameClass::Command {
            target,
            opcode: data,
        }
    }
}
