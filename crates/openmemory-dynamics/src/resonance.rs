use openmemory_core::constants::resonance;
use openmemory_core::memory::Sector;

/// Cross-sector resonance factor between a stored memory's sector and the
/// query's classified sector. `1.0` on the diagonal; looked up from the
/// static resonance matrix otherwise.
pub fn cross_sector_resonance(memory_sector: Sector, query_sector: Sector) -> f64 {
    resonance(memory_sector, query_sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_sector_resonates_fully() {
        assert_eq!(cross_sector_resonance(Sector::Emotional, Sector::Emotional), 1.0);
    }

    #[test]
    fn cross_sector_is_partial() {
        let r = cross_sector_resonance(Sector::Procedural, Sector::Reflective);
        assert!(r > 0.0 && r < 1.0);
    }
}
