use serde::{Deserialize, Serialize};

/// Logical direction of a port. Only used to pick the default attachment
/// side when a component is placed: inputs go on the left edge, everything
/// else on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone)]
pub struct PortDesc {
    pub name: String,
    pub direction: PortDirection,
}

/// Describes a component type: its name and ordered port list. The catalog
/// carries no electrical semantics; it only drives placement geometry.
#[derive(Debug, Clone)]
pub struct ComponentDesc {
    pub name: String,
    pub ports: Vec<PortDesc>,
}

impl ComponentDesc {
    pub fn new(name: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        let mut ports = Vec::with_capacity(inputs.len() + outputs.len());
        for input in inputs {
            ports.push(PortDesc {
                name: (*input).to_string(),
                direction: PortDirection::In,
            });
        }
        for output in outputs {
            ports.push(PortDesc {
                name: (*output).to_string(),
                direction: PortDirection::Out,
            });
        }
        Self {
            name: name.to_string(),
            ports,
        }
    }

    pub fn input_count(&self) -> usize {
        self.ports
            .iter()
            .filter(|port| port.direction == PortDirection::In)
            .count()
    }

    pub fn output_count(&self) -> usize {
        self.ports.len() - self.input_count()
    }
}

/// Stock two-state logic gates. The CLI, tests and benches all place
/// components from this catalog; applications embed their own.
pub fn standard_logic() -> Vec<ComponentDesc> {
    vec![
        ComponentDesc::new("NOT", &["a"], &["y"]),
        ComponentDesc::new("BUF", &["a"], &["y"]),
        ComponentDesc::new("AND", &["a", "b"], &["y"]),
        ComponentDesc::new("OR", &["a", "b"], &["y"]),
        ComponentDesc::new("XOR", &["a", "b"], &["y"]),
        ComponentDesc::new("NAND", &["a", "b"], &["y"]),
        ComponentDesc::new("NOR", &["a", "b"], &["y"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_port_counts() {
        let and = ComponentDesc::new("AND", &["a", "b"], &["y"]);
        assert_eq!(and.input_count(), 2);
        assert_eq!(and.output_count(), 1);
        assert_eq!(and.ports[0].name, "a");
        assert_eq!(and.ports[2].direction, PortDirection::Out);
    }

    #[test]
    fn standard_catalog_names_are_unique() {
        let catalog = standard_logic();
        for (i, a) in catalog.iter().enumerate() {
            for b in catalog.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
