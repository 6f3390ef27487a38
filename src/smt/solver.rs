/// Process-based glue around an external SMT solver, spoken to over the
/// textual SMT-LIB2 protocol via `rsmt2`. The solver itself is an oracle
/// this crate consumes — it is never bundled or reimplemented here.
use std::collections::HashMap;
use std::time::Duration;

use rsmt2::errors::SmtRes;
use rsmt2::parse::{ExprParser, IdentParser, ModelParser, ValueParser};
use rsmt2::{SmtConf, Solver};

use crate::errors::{EngineError, SolverError};
use crate::ir::var::Var;
use crate::smt::term::Term;

/// Parser glue satisfying `rsmt2`'s trait-based model/value parsing. Model
/// entries are handed back as their raw SMT-LIB text; `reify` is
/// responsible for turning that text into source-level literals.
#[derive(Clone, Copy)]
pub struct RawTextParser;

impl<'a> ValueParser<String, &'a str> for RawTextParser {
    fn parse_value(self, input: &'a str) -> SmtRes<String> {
        Ok(input.to_string())
    }
}

impl<'a> ExprParser<String, (), &'a str> for RawTextParser {
    fn parse_expr(self, input: &'a str, _: ()) -> SmtRes<String> {
        Ok(input.to_string())
    }
}

impl<'a> IdentParser<String, String, &'a str> for RawTextParser {
    fn parse_ident(self, input: &'a str) -> SmtRes<String> {
        Ok(input.to_string())
    }

    fn parse_type(self, input: &'a str) -> SmtRes<String> {
        Ok(input.to_string())
    }
}

impl<'a> ModelParser<String, String, String, &'a str> for RawTextParser {
    fn parse_value(self, input: &'a str, _ident: &String, _params: &[(String, String)], _typ: &String) -> SmtRes<String> {
        Ok(input.to_string())
    }
}

pub struct SolverGlue {
    inner: Solver<RawTextParser>,
    timeout_secs: u64,
}

impl SolverGlue {
    /// Spawns the solver process named by `binary` (e.g. `"z3"`, `"cvc5"`)
    /// with model production enabled.
    pub fn spawn(binary: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let mut conf = SmtConf::z3(binary);
        conf.models();
        let mut solver = Solver::new(conf, RawTextParser).map_err(|e| SolverError::Internal { message: e.to_string() })?;
        solver.set_option(":timeout", format!("{}", timeout_secs * 1000)).ok();
        Ok(SolverGlue { inner: solver, timeout_secs })
    }

    pub fn raw(&mut self, line: &str) -> Result<(), EngineError> {
        self.inner.raw_command(line).map_err(|e| SolverError::Internal { message: e.to_string() }.into())
    }

    pub fn assert(&mut self, term: &Term) -> Result<(), EngineError> {
        self.inner.assert(term).map_err(|e| SolverError::Internal { message: e.to_string() }.into())
    }

    pub fn push(&mut self) -> Result<(), EngineError> {
        self.inner.push(1).map_err(|e| SolverError::Internal { message: e.to_string() }.into())
    }

    pub fn pop(&mut self) -> Result<(), EngineError> {
        self.inner.pop(1).map_err(|e| SolverError::Internal { message: e.to_string() }.into())
    }

    /// Runs `check-sat`, mapping the solver's own timeout report onto
    /// `SolverError::Timeout`.
    pub fn check_sat(&mut self) -> Result<bool, EngineError> {
        match self.inner.check_sat() {
            Ok(sat) => Ok(sat),
            Err(e) => {
                let msg = e.to_string();
                if msg.to_lowercase().contains("timeout") || msg.to_lowercase().contains("timed out") {
                    Err(SolverError::Timeout { timeout_secs: self.timeout_secs }.into())
                } else {
                    Err(SolverError::Internal { message: msg }.into())
                }
            }
        }
    }

    /// Soft-assumption solving: tries `assumptions` all at once, and on
    /// unsat drops the most recently added one and retries, mirroring the
    /// last-in-first-dropped heuristic used to keep early path constraints
    /// (the ones closest to the function entry) over later ones.
    pub fn check_sat_with_soft_assumptions(&mut self, assumptions: &[(String, Term)]) -> Result<Vec<String>, EngineError> {
        let mut remaining: Vec<(String, Term)> = assumptions.to_vec();
        loop {
            self.push()?;
            for (_, term) in &remaining {
                self.assert(term)?;
            }
            let sat = self.check_sat()?;
            self.pop()?;
            if sat {
                return Ok(remaining.into_iter().map(|(name, _)| name).collect());
            }
            if remaining.pop().is_none() {
                return Ok(Vec::new());
            }
        }
    }

    /// Fetches raw model text for each variable, keyed by SSA name. Each
    /// entry is the solver's own printed representation of the value
    /// (`reify` parses the SMT-LIB literal syntax from there).
    pub fn get_model_text(&mut self, vars: &[Var]) -> Result<HashMap<String, String>, EngineError> {
        let exprs: Vec<String> = vars.iter().filter(|v| !v.is_constant).map(|v| v.name.clone()).collect();
        if exprs.is_empty() {
            return Ok(HashMap::new());
        }
        let values = self
            .inner
            .get_values(&exprs)
            .map_err(|e| SolverError::Internal { message: e.to_string() })?;
        Ok(values.into_iter().collect())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
