//! Expansion of parameter spaces into run configurations.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{ParamValue, ParameterSpace, RunConfig, SweepSchema};

/// How a parameter space is turned into runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Every combination of every candidate.
    #[default]
    Factorial,
    /// Exactly one parameter varies; the rest have a single candidate.
    SingleVariable,
}

/// The runs of one sweep, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub configs: Vec<RunConfig>,
    /// Parameter names in declared order
    pub parameters: Vec<String>,
    /// The parameter plotted on the x axis, if the sweep has one
    pub varying: Option<String>,
    /// Candidate count per parameter
    pub shape: Vec<usize>,
}

impl Expansion {
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

/// Expand a space according to `mode`.
pub fn expand(space: &ParameterSpace, mode: SweepMode) -> Result<Expansion, ConfigError> {
    match mode {
        SweepMode::Factorial => Ok(expand_factorial(space)),
        SweepMode::SingleVariable => expand_single(space),
    }
}

/// Cartesian product of all candidate lists.
///
/// Row-major over the declared axes: the last declared parameter varies
/// fastest.
#[must_use]
pub fn expand_factorial(space: &ParameterSpace) -> Expansion {
    let shape: Vec<usize> = space.axes().iter().map(|a| a.values.len()).collect();
    let configs = GridIndices::new(shape.clone())
        .map(|indices| {
            let values = space
                .axes()
                .iter()
                .zip(&indices)
                .map(|(axis, &i)| (axis.name.clone(), axis.values[i].clone()))
                .collect();
            RunConfig::from_parts(values)
        })
        .collect();

    // A factorial sweep with a single multi-valued axis still has an x axis.
    let varying = match space.varying().as_slice() {
        [only] => Some((*only).to_string()),
        _ => None,
    };

    Expansion {
        configs,
        parameters: space.names().into_iter().map(String::from).collect(),
        varying,
        shape,
    }
}

/// Vary one parameter and hold the rest.
///
/// More than one multi-valued parameter is rejected rather than silently
/// picking one. Output is sorted by the varying parameter's value.
pub fn expand_single(space: &ParameterSpace) -> Result<Expansion, ConfigError> {
    let varying = space.varying();
    if varying.len() > 1 {
        return Err(ConfigError::AmbiguousVariation(
            varying.into_iter().map(String::from).collect(),
        ));
    }
    let varying = varying.first().map(|s| (*s).to_string());

    let mut expansion = expand_factorial(space);
    if let Some(name) = &varying {
        expansion.configs.sort_by(|a, b| match (a.get(name), b.get(name)) {
            (Some(a), Some(b)) => a.total_cmp(b),
            _ => std::cmp::Ordering::Equal,
        });
    }
    expansion.varying = varying;
    Ok(expansion)
}

/// How the runs of one experiment are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepDesign {
    Factorial {
        space: ParameterSpace,
    },
    Single {
        space: ParameterSpace,
    },
    /// Several single-variable sweeps sharing one set of defaults.
    OneAtATime {
        defaults: RunConfig,
        vary: Vec<ParameterSpace>,
    },
}

impl SweepDesign {
    /// Rename legacy parameter names and check every schema field is covered.
    pub fn canonicalize(&self, schema: SweepSchema) -> Result<Self, ConfigError> {
        let complete = |space: &ParameterSpace| -> Result<ParameterSpace, ConfigError> {
            let space = space.canonicalize(schema)?;
            space.require_complete(schema)?;
            Ok(space)
        };
        Ok(match self {
            SweepDesign::Factorial { space } => SweepDesign::Factorial {
                space: complete(space)?,
            },
            SweepDesign::Single { space } => SweepDesign::Single {
                space: complete(space)?,
            },
            SweepDesign::OneAtATime { defaults, vary } => {
                let defaults = canonicalize_config(defaults, schema)?;
                let defaults_space =
                    ParameterSpace::new(defaults.iter().map(|(n, v)| (n, vec![v.clone()])))?;
                defaults_space.require_complete(schema)?;
                let vary = vary
                    .iter()
                    .map(|space| space.canonicalize(schema))
                    .collect::<Result<Vec<_>, _>>()?;
                SweepDesign::OneAtATime { defaults, vary }
            }
        })
    }

    /// Expand into one or more sweeps.
    pub fn expand(&self) -> Result<Vec<Expansion>, ConfigError> {
        match self {
            SweepDesign::Factorial { space } => Ok(vec![expand_factorial(space)]),
            SweepDesign::Single { space } => Ok(vec![expand_single(space)?]),
            SweepDesign::OneAtATime { defaults, vary } => vary
                .iter()
                .map(|variation| expand_single(&hold_defaults(defaults, variation)?))
                .collect(),
        }
    }
}

/// A space that takes `variation`'s candidates and `defaults` for everything else.
fn hold_defaults(
    defaults: &RunConfig,
    variation: &ParameterSpace,
) -> Result<ParameterSpace, ConfigError> {
    if let Some(axis) = variation
        .axes()
        .iter()
        .find(|axis| defaults.get(&axis.name).is_none())
    {
        return Err(ConfigError::NoDefault(axis.name.clone()));
    }
    let axes: Vec<(String, Vec<ParamValue>)> = defaults
        .iter()
        .map(|(name, value)| {
            let values = variation
                .axis(name)
                .map_or_else(|| vec![value.clone()], |axis| axis.values.clone());
            (name.to_string(), values)
        })
        .collect();
    ParameterSpace::new(axes)
}

fn canonicalize_config(config: &RunConfig, schema: SweepSchema) -> Result<RunConfig, ConfigError> {
    let renamed = config
        .iter()
        .map(|(name, value)| {
            schema
                .canonical_name(name)
                .map(|canonical| (canonical, value.clone()))
                .ok_or_else(|| ConfigError::UnknownParameter {
                    name: name.to_string(),
                    schema: schema.name(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    RunConfig::new(renamed)
}

/// Iterator over all indices of a grid in row-major order.
pub struct GridIndices {
    shape: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl GridIndices {
    #[must_use]
    pub fn new(shape: Vec<usize>) -> Self {
        let done = shape.iter().any(|&n| n == 0);
        Self {
            current: vec![0; shape.len()],
            shape,
            done,
        }
    }
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // A zero-dimensional grid has exactly one point.
        if self.shape.is_empty() {
            self.done = true;
        }

        // Last dimension varies fastest
        for i in (0..self.shape.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.shape[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }

        Some(result)
    }
}
