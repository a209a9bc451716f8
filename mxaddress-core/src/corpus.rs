//! # Endereços de Demonstração
//!
//! Exemplos reais de formato para a interface web e para testes manuais.
//! Cada um exercita um caso diferente da reconciliação.

/// Pares (caso, endereço) para demonstração.
pub fn demo_addresses() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Simples",
            "Calle Reforma 222, Col. Juárez, Cuauhtémoc, CP 06600, CDMX",
        ),
        (
            "Cruzamento",
            "Av. Insurgentes Sur 1602 entre Barranca del Muerto y Eje 6 Sur, Benito Juárez, Ciudad de México",
        ),
        (
            "Unidade composta",
            "Privada Olivos 12 Torre A Depto 301, Fracc. Las Flores, Mpo. Zapopan, Jalisco",
        ),
        (
            "Manzana e lote",
            "MZA 14 LT 7, Col. Santa Cruz Meyehualco, Deleg. Iztapalapa, Distrito Federal",
        ),
        (
            "Esquina",
            "Blvd. Kukulcán km 9 esq. con Calle Coral, Cancún, Quintana Roo",
        ),
        (
            "Destinatário",
            "Atn. María López, Circuito Interior 45 Int. 3 (Frente al parque), Monterrey, N.L.",
        ),
    ]
}
