//! Contact (adhesion) energy between neighboring cells.
//!
//! `H = ½ · Σ_{A≠B} J(τ_A, τ_B) · L(A, B)` over every pair of cells,
//! where `L` is the interface length in the registry's interface
//! neighborhood and `J` a symmetric table over cell types.
//!
//! The delta of a copy attempt is split over the two acting cells: the
//! losing cell `A` releases its contacts around the focus,
//! `−Σ_{C≠A} J(τ_A, τ_C) · n_C`, and the gaining cell `B` takes them
//! over, `+Σ_{C≠B} J(τ_B, τ_C) · n_C`, where `n_C` counts the focus
//! neighbors owned by `C`. The medium is an acting cell like any other.
//!
//! Sub-cells of different composites (or a sub-cell and a plain cell)
//! interact through their composites' types; sub-cells of the same
//! composite interact through their own types.

use indexmap::IndexMap;
use potts_cells::{CellClass, CellRegistry, CellRole, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError};
use potts_energy::{EnergyContext, EnergyContributor, Plugin, PluginError};

/// Contact energy with a symmetric per-type-pair table.
#[derive(Clone, Debug)]
pub struct InteractionEnergy {
    name: String,
    contacts: IndexMap<(CellTypeId, CellTypeId), f64>,
    default_energy: f64,
    strength: f64,
    negate: bool,
    normalize: bool,
}

/// Builder for [`InteractionEnergy`].
pub struct InteractionEnergyBuilder {
    name: String,
    contacts: Vec<(CellTypeId, CellTypeId, f64)>,
    default_energy: f64,
    strength: f64,
    negate: bool,
    normalize: bool,
}

fn key(a: CellTypeId, b: CellTypeId) -> (CellTypeId, CellTypeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl InteractionEnergy {
    /// Create a builder. Unlisted pairs default to 0.0.
    pub fn builder() -> InteractionEnergyBuilder {
        InteractionEnergyBuilder {
            name: "interaction".to_string(),
            contacts: Vec::new(),
            default_energy: 0.0,
            strength: 1.0,
            negate: false,
            normalize: false,
        }
    }

    /// Contact energy per unit interface between two types, after
    /// negation and strength scaling.
    pub fn contact(&self, a: CellTypeId, b: CellTypeId) -> f64 {
        let j = self
            .contacts
            .get(&key(a, b))
            .copied()
            .unwrap_or(self.default_energy);
        let j = if self.negate { -j } else { j };
        j * self.strength
    }

    /// The types `a` and `b` interact through.
    fn contact_types(registry: &CellRegistry, a: CellId, b: CellId) -> Result<(CellTypeId, CellTypeId), EnergyError> {
        let pa = registry.composite_of(a);
        let pb = registry.composite_of(b);
        let (ta, tb) = match (pa, pb) {
            (Some(x), Some(y)) if x == y => (a, b),
            _ => (pa.unwrap_or(a), pb.unwrap_or(b)),
        };
        Ok((registry.type_of(ta)?, registry.type_of(tb)?))
    }

    /// Σ over focus neighbors `C ≠ cell` of `J(cell, C) · n_C`.
    fn focus_contacts(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        registry: &CellRegistry,
    ) -> Result<f64, EnergyError> {
        let mut sum = 0.0;
        for &(other, n) in proposal.neighbors() {
            if other == cell {
                continue;
            }
            let (ta, tb) = Self::contact_types(registry, cell, other)?;
            sum += self.contact(ta, tb) * f64::from(n);
        }
        Ok(sum)
    }

    fn scale(&self, registry: &CellRegistry) -> f64 {
        if self.normalize {
            let size = registry.interface_neighborhood().len();
            if size > 0 {
                return 1.0 / size as f64;
            }
        }
        1.0
    }
}

impl InteractionEnergyBuilder {
    /// Instance name (default `"interaction"`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Contact energy between `a` and `b` (order irrelevant). A later
    /// entry for the same pair replaces an earlier one.
    pub fn contact(mut self, a: CellTypeId, b: CellTypeId, energy: f64) -> Self {
        self.contacts.push((a, b, energy));
        self
    }

    /// Energy for pairs without an explicit entry (default 0.0).
    pub fn default_energy(mut self, energy: f64) -> Self {
        self.default_energy = energy;
        self
    }

    /// Global multiplier (default 1.0).
    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Flip the sign of every contact energy, so that listed values are
    /// adhesion strengths rather than energies.
    pub fn negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    /// Divide energies by the interface neighborhood size, making them
    /// comparable across neighborhood orders.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Build the plugin.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any energy or the strength is not finite.
    pub fn build(self) -> Result<InteractionEnergy, PluginError> {
        if !self.strength.is_finite() {
            return Err(PluginError::invalid(
                &self.name,
                "strength",
                format!("must be finite, got {}", self.strength),
            ));
        }
        if !self.default_energy.is_finite() {
            return Err(PluginError::invalid(
                &self.name,
                "default_energy",
                format!("must be finite, got {}", self.default_energy),
            ));
        }
        let mut contacts = IndexMap::new();
        for (a, b, j) in self.contacts {
            if !j.is_finite() {
                return Err(PluginError::invalid(
                    &self.name,
                    "contact",
                    format!("energy between types {a} and {b} must be finite, got {j}"),
                ));
            }
            contacts.insert(key(a, b), j);
        }
        Ok(InteractionEnergy {
            name: self.name,
            contacts,
            default_energy: self.default_energy,
            strength: self.strength,
            negate: self.negate,
            normalize: self.normalize,
        })
    }
}

impl Plugin for InteractionEnergy {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for InteractionEnergy {
    fn applies_to(&self, class: CellClass, _cell_type: CellTypeId) -> bool {
        class != CellClass::Composite
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        if self.strength == 0.0 {
            return Ok(0.0);
        }
        let registry = ctx.registry();
        let sign = match proposal.role_of(cell) {
            Some(CellRole::Gains) => 1.0,
            Some(CellRole::Loses) => -1.0,
            Some(CellRole::Shifts) | None => return Ok(0.0),
        };
        Ok(sign * self.focus_contacts(cell, proposal, registry)? * self.scale(registry))
    }

    fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        if self.strength == 0.0 {
            return Ok(0.0);
        }
        let registry = ctx.registry();
        let mut sum = 0.0;
        for (&other, &len) in registry.interfaces(cell)? {
            let (ta, tb) = Self::contact_types(registry, cell, other)?;
            sum += self.contact(ta, tb) * f64::from(len);
        }
        Ok(0.5 * sum * self.scale(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potts_cells::CellProperties;
    use potts_core::{McsId, NoSymbols, Site};
    use potts_test_utils::{block, periodic_square, three_segment_chain};

    const CELL: CellTypeId = CellTypeId(1);

    fn total(plugin: &InteractionEnergy, reg: &CellRegistry) -> f64 {
        let props = CellProperties::new();
        let ctx = EnergyContext::new(reg, &props, &NoSymbols, McsId(0));
        reg.cells()
            .filter(|r| plugin.applies_to(r.class(), r.cell_type()))
            .map(|r| plugin.hamiltonian(r.id(), &ctx).unwrap())
            .sum()
    }

    fn summed_delta(plugin: &InteractionEnergy, reg: &CellRegistry, p: &UpdateProposal) -> f64 {
        let props = CellProperties::new();
        let ctx = EnergyContext::new(reg, &props, &NoSymbols, McsId(0));
        p.acting_cells()
            .into_iter()
            .filter(|&c| {
                let r = reg.cell(c).unwrap();
                plugin.applies_to(r.class(), r.cell_type())
            })
            .map(|c| plugin.delta(c, p, &ctx).unwrap())
            .sum()
    }

    // ── Table ───────────────────────────────────────────────────

    #[test]
    fn table_is_symmetric_with_default() {
        let plugin = InteractionEnergy::builder()
            .contact(CELL, CellTypeId::MEDIUM, 8.0)
            .contact(CellTypeId(2), CELL, 3.0)
            .default_energy(1.5)
            .build()
            .unwrap();
        assert_eq!(plugin.contact(CellTypeId::MEDIUM, CELL), 8.0);
        assert_eq!(plugin.contact(CELL, CellTypeId(2)), 3.0);
        assert_eq!(plugin.contact(CELL, CELL), 1.5);
    }

    #[test]
    fn negation_and_strength() {
        let plugin = InteractionEnergy::builder()
            .contact(CELL, CELL, 2.0)
            .negate(true)
            .strength(3.0)
            .build()
            .unwrap();
        assert_eq!(plugin.contact(CELL, CELL), -6.0);
        assert!(InteractionEnergy::builder()
            .contact(CELL, CELL, f64::INFINITY)
            .build()
            .is_err());
    }

    // ── Deltas ──────────────────────────────────────────────────

    #[test]
    fn delta_matches_hamiltonian_difference() {
        let mut reg = periodic_square(10);
        block(&mut reg, CELL, 2..5, 2..5);
        block(&mut reg, CellTypeId(2), 5..7, 2..5);
        let plugin = InteractionEnergy::builder()
            .contact(CELL, CellTypeId::MEDIUM, 6.0)
            .contact(CellTypeId(2), CellTypeId::MEDIUM, 4.0)
            .contact(CELL, CellTypeId(2), 1.0)
            .build()
            .unwrap();

        let moves = [
            (Site::new(5, 3, 0), Site::new(4, 3, 0)),
            (Site::new(4, 5, 0), Site::new(4, 4, 0)),
            (Site::new(6, 2, 0), Site::new(6, 1, 0)),
        ];
        for (focus, source) in moves {
            let p = UpdateProposal::build(&reg, focus, source).unwrap();
            let before = total(&plugin, &reg);
            let d = summed_delta(&plugin, &reg, &p);
            reg.commit(&p).unwrap();
            let after = total(&plugin, &reg);
            assert!((after - before - d).abs() < 1e-9, "{focus}: {d} vs {}", after - before);
        }
    }

    #[test]
    fn normalization_divides_by_neighborhood_size() {
        let mut reg = periodic_square(6);
        let cell = block(&mut reg, CELL, 1..2, 1..2);
        let plugin = InteractionEnergy::builder()
            .contact(CELL, CellTypeId::MEDIUM, 2.0)
            .normalize(true)
            .build()
            .unwrap();
        let props = CellProperties::new();
        let ctx = EnergyContext::new(&reg, &props, &NoSymbols, McsId(0));
        // ½ · 2 · 4 / 4
        assert_eq!(plugin.hamiltonian(cell, &ctx), Ok(1.0));
    }

    #[test]
    fn segments_use_composite_type_outside_their_chain() {
        let mut reg = periodic_square(20);
        let (_, [s0, s1, _]) = three_segment_chain(&mut reg, CellTypeId(3), CellTypeId(4), 2, 2);
        let other = block(&mut reg, CELL, 2..5, 5..6);
        assert_eq!(
            InteractionEnergy::contact_types(&reg, s0, s1),
            Ok((CellTypeId(3), CellTypeId(3)))
        );
        assert_eq!(
            InteractionEnergy::contact_types(&reg, s0, other),
            Ok((CellTypeId(4), CELL))
        );
        assert_eq!(
            InteractionEnergy::contact_types(&reg, s1, CellId::MEDIUM),
            Ok((CellTypeId(4), CellTypeId::MEDIUM))
        );
    }

    #[test]
    fn composites_are_skipped() {
        let plugin = InteractionEnergy::builder().build().unwrap();
        assert!(plugin.applies_to(CellClass::Medium, CellTypeId::MEDIUM));
        assert!(plugin.applies_to(CellClass::SubCell, CELL));
        assert!(!plugin.applies_to(CellClass::Composite, CELL));
    }
}
