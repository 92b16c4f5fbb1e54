//! Packs cart lines into boxes.
//!
//! Units are packed greedily, in cart order, into the largest configured
//! box. When the next unit no longer fits, the box is closed and shrunk to
//! the smallest configured size that still holds its volume, mass and
//! longest item. Units too large for every box ship on their own.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use super::{PackingSettings, PayloadBuildError};
use crate::models::CartLine;

/// Most units a single cart may expand into.
pub const MAX_UNITS: u32 = 1_000;

/// A configured box (or flyer) size in centimetres and kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSize {
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
    pub max_mass_kg: Decimal,
}

/// A box size string that is not `LxWxH:maxKg`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid box size `{0}` (expected LxWxH:maxKg)")]
pub struct BoxSizeParseError(String);

impl BoxSize {
    fn sorted_dims(&self) -> [Decimal; 3] {
        sorted([self.length_cm, self.width_cm, self.height_cm])
    }

    /// Volume in cubic centimetres, saturating at `Decimal::MAX`.
    fn volume(&self) -> Decimal {
        volume_of([self.length_cm, self.width_cm, self.height_cm]).unwrap_or(Decimal::MAX)
    }

    /// Whether an item with these (descending) dimensions fits.
    fn holds(&self, dims: [Decimal; 3]) -> bool {
        self.sorted_dims()
            .iter()
            .zip(dims.iter())
            .all(|(outer, inner)| inner <= outer)
    }
}

impl FromStr for BoxSize {
    type Err = BoxSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BoxSizeParseError(s.to_string());

        let (dims, mass) = s.trim().split_once(':').ok_or_else(err)?;
        let parts: Vec<Decimal> = dims
            .split(['x', 'X'])
            .map(|part| Decimal::from_str(part.trim()))
            .collect::<Result<_, _>>()
            .map_err(|_| err())?;
        let max_mass_kg = Decimal::from_str(mass.trim()).map_err(|_| err())?;

        let [length_cm, width_cm, height_cm] = parts[..] else {
            return Err(err());
        };
        if [length_cm, width_cm, height_cm, max_mass_kg]
            .iter()
            .any(|value| *value <= Decimal::ZERO)
        {
            return Err(err());
        }

        Ok(Self {
            length_cm,
            width_cm,
            height_cm,
            max_mass_kg,
        })
    }
}

/// One packed box.
///
/// Dimensions are in centimetres, `actual_mass` in the store's weight unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedEntry {
    pub dim1: Decimal,
    pub dim2: Decimal,
    pub dim3: Decimal,
    /// Product names, each followed by `", "`.
    pub description: String,
    /// Units in a packed box.
    pub item_count: Option<u32>,
    /// Units in a single-parcel box.
    pub item: Option<u32>,
    pub actual_mass: Decimal,
}

/// Result of packing a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedContents {
    pub entries: Vec<PackedEntry>,
    /// Every packable unit fits the configured flyer.
    pub fits_flyer: bool,
}

struct Unit<'a> {
    name: &'a str,
    dims: [Decimal; 3],
    volume: Decimal,
    mass: Decimal,
}

struct OpenBox<'a> {
    names: Vec<&'a str>,
    extents: [Decimal; 3],
    volume: Decimal,
    mass: Decimal,
    count: u32,
}

impl<'a> OpenBox<'a> {
    fn new(unit: &Unit<'a>) -> Self {
        Self {
            names: vec![unit.name],
            extents: unit.dims,
            volume: unit.volume,
            mass: unit.mass,
            count: 1,
        }
    }

    /// Add a unit if the box stays within `volume_limit` and `mass_limit`.
    fn try_add(&mut self, unit: &Unit<'a>, volume_limit: Decimal, mass_limit: Decimal) -> bool {
        let (Some(volume), Some(mass)) = (
            self.volume.checked_add(unit.volume),
            self.mass.checked_add(unit.mass),
        ) else {
            return false;
        };
        if volume > volume_limit || mass > mass_limit {
            return false;
        }

        if !self.names.contains(&unit.name) {
            self.names.push(unit.name);
        }
        for (extent, dim) in self.extents.iter_mut().zip(unit.dims) {
            *extent = (*extent).max(dim);
        }
        self.volume = volume;
        self.mass = mass;
        self.count += 1;
        true
    }
}

/// Pack cart lines into boxes.
///
/// # Errors
///
/// Returns `PayloadBuildError::MissingDimension` if any line lacks a
/// positive length, width or height, `Oversize` if a line's measurements
/// cannot be represented, and `TooManyUnits` if the cart expands into more
/// than [`MAX_UNITS`] units.
pub fn pack(
    lines: &[CartLine],
    settings: &PackingSettings,
) -> Result<PackedContents, PayloadBuildError> {
    let mut boxes = settings.parcel_sizes.clone();
    boxes.sort_by(|a, b| a.volume().cmp(&b.volume()));
    let max_mass = |size: &BoxSize| settings.weight_unit.from_kg(size.max_mass_kg);

    let lines: Vec<&CartLine> = lines.iter().filter(|line| line.quantity > 0).collect();
    let total_units = lines
        .iter()
        .try_fold(0_u32, |total, line| total.checked_add(line.quantity))
        .filter(|total| *total <= MAX_UNITS);
    if total_units.is_none() {
        return Err(PayloadBuildError::TooManyUnits { max: MAX_UNITS });
    }

    let mut entries = Vec::new();
    let mut units = Vec::new();

    for line in lines {
        let dims = line_dimensions(line, settings)?;
        let volume = volume_of(dims).ok_or_else(|| PayloadBuildError::Oversize {
            product: line.name.clone(),
        })?;
        let mass = line.weight.unwrap_or_default().max(Decimal::ZERO);

        if line.single_parcel {
            for _ in 0..line.quantity {
                entries.push(PackedEntry {
                    dim1: dims[0],
                    dim2: dims[1],
                    dim3: dims[2],
                    description: format!("{}, ", line.name),
                    item_count: None,
                    item: Some(1),
                    actual_mass: mass,
                });
            }
        } else {
            for _ in 0..line.quantity {
                units.push(Unit {
                    name: &line.name,
                    dims,
                    volume,
                    mass,
                });
            }
        }
    }

    let fits_flyer = !units.is_empty()
        && settings.flyer_size.is_some_and(|flyer| {
            units
                .iter()
                .all(|unit| flyer.holds(unit.dims) && unit.mass <= max_mass(&flyer))
        });

    let mut open: Option<OpenBox<'_>> = None;
    for unit in &units {
        match boxes.last() {
            Some(largest) if largest.holds(unit.dims) && unit.mass <= max_mass(largest) => {
                let added = open
                    .as_mut()
                    .is_some_and(|current| current.try_add(unit, largest.volume(), max_mass(largest)));
                if !added {
                    if let Some(full) = open.replace(OpenBox::new(unit)) {
                        entries.push(close(full, &boxes, &max_mass));
                    }
                }
            }
            _ => entries.push(close(OpenBox::new(unit), &[], &max_mass)),
        }
    }
    if let Some(last) = open {
        entries.push(close(last, &boxes, &max_mass));
    }

    Ok(PackedContents {
        entries,
        fits_flyer,
    })
}

/// Shrink a box to the smallest size that holds it. Without a fitting size
/// the box takes the extents of its contents.
fn close(
    packed: OpenBox<'_>,
    boxes: &[BoxSize],
    max_mass: &impl Fn(&BoxSize) -> Decimal,
) -> PackedEntry {
    let dims = boxes
        .iter()
        .find(|size| {
            size.volume() >= packed.volume
                && max_mass(size) >= packed.mass
                && size.holds(packed.extents)
        })
        .map_or(packed.extents, BoxSize::sorted_dims);

    let description: String = packed.names.iter().map(|name| format!("{name}, ")).collect();

    PackedEntry {
        dim1: dims[0],
        dim2: dims[1],
        dim3: dims[2],
        description,
        item_count: Some(packed.count),
        item: None,
        actual_mass: packed.mass,
    }
}

/// Line dimensions in centimetres, longest first.
fn line_dimensions(
    line: &CartLine,
    settings: &PackingSettings,
) -> Result<[Decimal; 3], PayloadBuildError> {
    let mut dims = [Decimal::ZERO; 3];
    for (slot, (field, value)) in dims.iter_mut().zip([
        ("length", line.length),
        ("width", line.width),
        ("height", line.height),
    ]) {
        match value {
            Some(value) if value > Decimal::ZERO => {
                *slot = settings.dimension_unit.to_cm(value).ok_or_else(|| {
                    PayloadBuildError::Oversize {
                        product: line.name.clone(),
                    }
                })?;
            }
            _ => {
                return Err(PayloadBuildError::MissingDimension {
                    product: line.name.clone(),
                    field,
                });
            }
        }
    }
    Ok(sorted(dims))
}

fn volume_of(dims: [Decimal; 3]) -> Option<Decimal> {
    dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

fn sorted(mut dims: [Decimal; 3]) -> [Decimal; 3] {
    dims.sort_by(|a, b| b.cmp(a));
    dims
}
