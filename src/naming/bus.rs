use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::NotationError;

/// Prefix of names synthesised for pin bits with no net bit to pair with.
pub const DANGLING_PREFIX: &str = "dnet";

/// Widest bus a net or pin name may declare.
pub const MAX_BUS_WIDTH: u64 = 1 << 16;

static BUS_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([^<>:\s]+)<(\d+)(?::(\d+))?>$").ok());

/// An index range of a bus, walked from `start` to `end` in either direction.
///
/// `(0, 0)` stands for a scalar (single-bit) name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BusRange {
    pub start: u32,
    pub end: u32,
}

impl BusRange {
    /// The range of a plain, single-bit name.
    pub const SCALAR: Self = Self { start: 0, end: 0 };

    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns `true` for the `(0, 0)` range of a plain name.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        *self == Self::SCALAR
    }

    /// Number of bits covered by the range.
    #[must_use]
    pub fn width(&self) -> u64 {
        u64::from(self.start.abs_diff(self.end)) + 1
    }

    /// Returns `true` if `index` lies between the two bounds.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.start.min(self.end) <= index && index <= self.start.max(self.end)
    }

    /// Lazily walks the bus indices: low to high for ascending ranges, high
    /// to low for descending ones.
    pub fn walk(&self) -> impl Iterator<Item = u32> {
        let (start, ascending) = (self.start, self.start <= self.end);
        (0..=self.start.abs_diff(self.end)).map(move |k| {
            if ascending {
                start + k
            } else {
                start - k
            }
        })
    }

    /// Bus indices in walk order.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.walk().collect()
    }
}

impl From<(u32, u32)> for BusRange {
    fn from((start, end): (u32, u32)) -> Self {
        Self::new(start, end)
    }
}

/// A net or pin name split into its base and bus range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusName {
    pub base: String,
    pub range: BusRange,
}

impl BusName {
    /// A plain name with the scalar range.
    #[must_use]
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            range: BusRange::SCALAR,
        }
    }

    /// Returns `true` if the name carries a non-scalar range.
    #[must_use]
    pub fn is_bus(&self) -> bool {
        !self.range.is_scalar()
    }
}

/// Splits `name` into base name and bus range.
///
/// Plain names map to `(name, (0, 0))`; `base<i>` maps to `(base, (i, i))`
/// and `base<lo:hi>` keeps the written order of the bounds.
///
/// # Errors
///
/// Returns an error for an empty name, whitespace, any use of `<`, `>` or
/// `:` outside the two bus forms, or a range wider than [`MAX_BUS_WIDTH`].
pub fn parse_bus_notation(name: &str) -> Result<BusName, NotationError> {
    if name.is_empty() {
        return Err(NotationError::Empty);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(NotationError::InvalidCharacter(name.to_string()));
    }
    if !name.contains(['<', '>', ':']) {
        return Ok(BusName::plain(name));
    }

    let malformed = || NotationError::MalformedBus(name.to_string());
    let caps = BUS_NAME
        .as_ref()
        .and_then(|re| re.captures(name))
        .ok_or_else(malformed)?;
    let base = caps.get(1).ok_or_else(malformed)?.as_str();
    let start: u32 = caps
        .get(2)
        .ok_or_else(malformed)?
        .as_str()
        .parse()
        .map_err(|_| malformed())?;
    let end: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| malformed())?,
        None => start,
    };
    let range = BusRange::new(start, end);
    if range.width() > MAX_BUS_WIDTH {
        return Err(NotationError::RangeTooWide {
            name: name.to_string(),
            width: range.width(),
        });
    }

    Ok(BusName {
        base: base.to_string(),
        range,
    })
}

/// Lenient form of [`parse_bus_notation`] used while naming nets.
///
/// Malformed notation is kept as an opaque plain name and logged.
#[must_use]
pub fn resolve_bus_notation(name: &str) -> BusName {
    match parse_bus_notation(name) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(name, %err, "treating malformed net name as a plain name");
            BusName::plain(name)
        }
    }
}

/// Returns `true` if `name` is a valid plain or bus net name.
#[must_use]
pub fn is_valid_net_name(name: &str) -> bool {
    parse_bus_notation(name).is_ok()
}

/// Name of a single bit of a bus.
#[must_use]
pub fn bit_name(base: &str, index: u32) -> String {
    format!("{base}<{index}>")
}

/// Pairs the bits of a pin with the bits of the net it is connected to.
///
/// Pin and net ranges are walked in their own direction and paired by walk
/// position. Pin bits without a net bit get a fresh `dnet{counter}` name,
/// incrementing `counter` each time. Two scalar names pair as-is. Returns the
/// pairs and the updated counter.
#[must_use]
pub fn match_pin_to_bus(
    pin_base: &str,
    pin_range: BusRange,
    net_base: &str,
    net_range: BusRange,
    counter: u32,
) -> (Vec<(String, String)>, u32) {
    let mut counter = counter;

    if pin_range.is_scalar() {
        let net = if net_range.is_scalar() {
            net_base.to_string()
        } else {
            if net_range.width() > 1 {
                warn!(
                    pin = pin_base,
                    net = net_base,
                    width = net_range.width(),
                    "scalar pin connected to a bus; using its first bit"
                );
            }
            bit_name(net_base, net_range.start)
        };
        return (vec![(pin_base.to_string(), net)], counter);
    }

    let pin_bits = pin_range.indices();
    let net_width = if net_range.is_scalar() { 0 } else { net_range.width() };
    if pin_range.width() != net_width {
        warn!(
            pin = pin_base,
            net = net_base,
            pin_width = pin_range.width(),
            net_width,
            "bus width mismatch between pin and net"
        );
    }
    // Only as many net bits as the pin can use are ever named.
    let net_bits: Vec<String> = if net_range.is_scalar() {
        Vec::new()
    } else {
        net_range
            .walk()
            .take(pin_bits.len())
            .map(|i| bit_name(net_base, i))
            .collect()
    };

    let mut pairs = Vec::with_capacity(pin_bits.len());
    for (position, index) in pin_bits.into_iter().enumerate() {
        let net = if let Some(bit) = net_bits.get(position) {
            bit.clone()
        } else {
            let name = format!("{DANGLING_PREFIX}{counter}");
            counter += 1;
            name
        };
        pairs.push((bit_name(pin_base, index), net));
    }

    (pairs, counter)
}
