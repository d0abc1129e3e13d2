/// An arcade board family or manufacturer that gets its own auto collection.
///
/// Arcade games carry an `arcade_system_name` (e.g. "cps2") in their
/// metadata; each entry here turns into a `z<short_name>` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArcadeSystem {
    pub id: u16,
    pub short_name: &'static str,
    pub display_name: &'static str,
}

const fn arcade(id: u16, short_name: &'static str, display_name: &'static str) -> ArcadeSystem {
    ArcadeSystem {
        id,
        short_name,
        display_name,
    }
}

/// All known arcade systems, ordered by id.
const ARCADE_SYSTEMS: &[ArcadeSystem] = &[
    arcade(6, "cps1", "CPS-1"),
    arcade(7, "cps2", "CPS-2"),
    arcade(8, "cps3", "CPS-3"),
    arcade(35, "aae", "Another Arcade Emulator"),
    arcade(47, "cave", "Cave"),
    arcade(49, "daphne", "Daphne"),
    arcade(53, "atomiswave", "Atomiswave"),
    arcade(54, "model2", "Sega Model 2"),
    arcade(55, "model3", "Sega Model 3"),
    arcade(56, "naomi", "Naomi"),
    arcade(68, "neogeomvs", "Neo-Geo MVS"),
    arcade(69, "segastv", "Sega ST-V"),
    arcade(112, "taitox", "Taito Type X"),
    arcade(142, "neogeo", "Neo-Geo"),
    arcade(147, "sega", "Sega"),
    arcade(148, "irem", "Irem"),
    arcade(149, "seta", "Seta"),
    arcade(150, "midway", "Midway"),
    arcade(151, "capcom", "Capcom"),
    arcade(152, "eighting", "Eighting/Raizing"),
    arcade(153, "tecmo", "Tecmo"),
    arcade(154, "snk", "SNK"),
    arcade(155, "namco", "Namco"),
    arcade(156, "namco22", "Namco System 22"),
    arcade(157, "taito", "Taito"),
    arcade(158, "konami", "Konami"),
    arcade(159, "jaleco", "Jaleco"),
    arcade(160, "atari", "Atari"),
    arcade(161, "nintendo", "Nintendo"),
    arcade(162, "dataeast", "Data East"),
    arcade(163, "nmk", "NMK"),
    arcade(164, "sammy", "Sammy"),
    arcade(165, "exidy", "Exidy"),
    arcade(166, "acclaim", "Acclaim"),
    arcade(167, "psikyo", "Psikyo"),
    arcade(169, "technos", "Technos"),
    arcade(170, "alg", "American Laser Games"),
    arcade(173, "dynax", "Dynax"),
    arcade(174, "kaneko", "Kaneko"),
    arcade(175, "vsc", "Video System Co."),
    arcade(176, "igs", "IGS"),
    arcade(177, "comad", "Comad"),
    arcade(178, "amcoe", "Amcoe"),
    arcade(179, "centurye", "Century Electronics"),
    arcade(180, "nichibutsu", "Nichibutsu"),
    arcade(181, "visco", "Visco"),
    arcade(182, "alphadenshi", "Alpha Denshi Co."),
    arcade(183, "coleco", "Coleco"),
    arcade(184, "playchoice", "PlayChoice"),
    arcade(185, "atlus", "Atlus"),
    arcade(186, "banpresto", "Banpresto"),
    arcade(187, "semicom", "SemiCom"),
    arcade(188, "universal", "Universal"),
    arcade(189, "mitchell", "Mitchell"),
    arcade(190, "seibukaihatsu", "Seibu Kaihatsu"),
    arcade(191, "toaplan", "Toaplan"),
    arcade(192, "cinematronics", "Cinematronics"),
    arcade(193, "incredibletech", "Incredible Technologies"),
    arcade(194, "gaelco", "Gaelco"),
    arcade(195, "megatech", "Mega-Tech"),
    arcade(196, "megaplay", "Mega-Play"),
    arcade(209, "gottlieb", "Gottlieb"),
];

impl ArcadeSystem {
    pub fn all() -> &'static [ArcadeSystem] {
        ARCADE_SYSTEMS
    }

    pub fn by_id(id: u16) -> Option<&'static ArcadeSystem> {
        ARCADE_SYSTEMS.iter().find(|a| a.id == id)
    }

    /// Case-insensitive lookup by short name.
    pub fn by_short_name(name: &str) -> Option<&'static ArcadeSystem> {
        ARCADE_SYSTEMS
            .iter()
            .find(|a| a.short_name.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ArcadeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name)
    }
}

#[cfg(test)]
#[path = "tests/arcade_tests.rs"]
mod tests;
