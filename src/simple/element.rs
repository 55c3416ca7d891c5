//! Compact element table covering the elements the reference engine parses.
//!
//! Unknown atomic numbers degrade gracefully: they are skipped by the
//! valence check and contribute zero weight to composition analysis.

macro_rules! elements {
    ($(($variant:ident, $num:expr, $sym:expr, $weight:expr, $exact:expr, [$($val:expr),*])),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Element {
            $($variant),*
        }

        impl Element {
            pub fn from_atomic_num(num: u8) -> Option<Element> {
                match num {
                    $($num => Some(Element::$variant),)*
                    _ => None,
                }
            }

            pub fn from_symbol(sym: &str) -> Option<Element> {
                match sym {
                    $($sym => Some(Element::$variant),)*
                    _ => None,
                }
            }

            pub fn atomic_num(self) -> u8 {
                match self {
                    $(Element::$variant => $num),*
                }
            }

            pub fn symbol(self) -> &'static str {
                match self {
                    $(Element::$variant => $sym),*
                }
            }

            /// Standard atomic weight averaged over natural abundance.
            pub fn atomic_weight(self) -> f64 {
                match self {
                    $(Element::$variant => $weight),*
                }
            }

            /// Exact mass of the most abundant isotope.
            pub fn exact_mass(self) -> f64 {
                match self {
                    $(Element::$variant => $exact),*
                }
            }

            /// Allowed valences for neutral atoms; empty means the engine
            /// has no valence model for the element (metals).
            pub fn default_valences(self) -> &'static [u8] {
                match self {
                    $(Element::$variant => &[$($val),*]),*
                }
            }
        }
    };
}

elements! {
    (H,  1,  "H",  1.008,        1.00782503207, [1]),
    (B,  5,  "B",  10.811,       11.00930536,   [3]),
    (C,  6,  "C",  12.011,       12.0,          [4]),
    (N,  7,  "N",  14.007,       14.0030740048, [3, 5]),
    (O,  8,  "O",  15.999,       15.99491461957, [2]),
    (F,  9,  "F",  18.998403163, 18.99840322,   [1]),
    (Na, 11, "Na", 22.98976928,  22.9897692809, []),
    (Mg, 12, "Mg", 24.305,       23.98504170,   []),
    (Si, 14, "Si", 28.085,       27.97692653465, [4]),
    (P,  15, "P",  30.973761998, 30.97376163,   [3, 5]),
    (S,  16, "S",  32.06,        31.97207100,   [2, 4, 6]),
    (Cl, 17, "Cl", 35.45,        34.96885268,   [1]),
    (K,  19, "K",  39.0983,      38.96370668,   []),
    (Ca, 20, "Ca", 40.078,       39.96259098,   []),
    (Fe, 26, "Fe", 55.845,       55.9349375,    []),
    (Zn, 30, "Zn", 65.38,        63.9291422,    []),
    (Br, 35, "Br", 79.904,       78.9183371,    [1]),
    (I,  53, "I",  126.90447,    126.904473,    [1]),
}

impl Element {
    /// Elements writable without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    /// Elements with an aromatic lowercase form.
    pub fn has_aromatic_form(self) -> bool {
        matches!(
            self,
            Element::B | Element::C | Element::N | Element::O | Element::P | Element::S
        )
    }
}

/// Implicit hydrogen count the reader infers for a bare organic-subset atom:
/// fill up to the lowest allowed valence, with one H withheld on aromatic
/// atoms to leave room for the delocalized bond.
pub fn implicit_hydrogens(elem: Element, is_aromatic: bool, bond_order_sum: u8) -> u8 {
    let valences = elem.default_valences();
    let target = valences
        .iter()
        .find(|&&v| v >= bond_order_sum)
        .copied()
        .unwrap_or(0);
    if target < bond_order_sum {
        return 0;
    }
    let mut h = target - bond_order_sum;
    if is_aromatic && h > 0 {
        h -= 1;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for num in [1u8, 6, 7, 8, 16, 17, 35, 53] {
            let elem = Element::from_atomic_num(num).unwrap();
            assert_eq!(Element::from_symbol(elem.symbol()), Some(elem));
        }
    }

    #[test]
    fn unknown_atomic_num() {
        assert_eq!(Element::from_atomic_num(0), None);
        assert_eq!(Element::from_atomic_num(118), None);
    }

    #[test]
    fn carbon_hydrogens() {
        assert_eq!(implicit_hydrogens(Element::C, false, 0), 4);
        assert_eq!(implicit_hydrogens(Element::C, false, 3), 1);
        assert_eq!(implicit_hydrogens(Element::C, false, 5), 0);
        // aromatic carbon withholds one H
        assert_eq!(implicit_hydrogens(Element::C, true, 2), 1);
    }

    #[test]
    fn sulfur_expands_valence() {
        assert_eq!(implicit_hydrogens(Element::S, false, 0), 2);
        assert_eq!(implicit_hydrogens(Element::S, false, 6), 0);
        assert_eq!(implicit_hydrogens(Element::S, false, 3), 1);
    }

    #[test]
    fn metals_have_no_valences() {
        assert!(Element::Fe.default_valences().is_empty());
        assert_eq!(implicit_hydrogens(Element::Fe, false, 0), 0);
    }
}
