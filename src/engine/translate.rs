/// The dynamic, path-sensitive translator: walks one path at a time,
/// pruning infeasible branches with a solver call at every fork.
use std::collections::HashMap;

use crate::engine::queue::Queue;
use crate::engine::state::State;
use crate::errors::{BoundaryError, EngineError, StructuralError};
use crate::ir::formula::Formula;
use crate::ir::types::Ty;
use crate::ir::var::Var;
use crate::smt::ctx::EncodingContext;
use crate::smt::solver::SolverGlue;
use crate::ssa::{Function, Instr, Terminator};

/// One discovered, solver-confirmed path through a function: the raw
/// model text per free input variable (parsed into source literals by
/// `reify`), plus enough metadata to name and type-check the emitted test.
#[derive(Debug, Clone)]
pub struct Testcase {
    pub function: String,
    pub params: Vec<Var>,
    pub result_ty: Ty,
    /// Raw SMT-LIB literal text per input parameter name.
    pub model: HashMap<String, String>,
}

pub struct RunOutcome {
    pub testcases: Vec<Testcase>,
    pub abandoned: usize,
}

/// Explore every feasible path through `functions[entry]`, calling back
/// into `functions` for same-package callees. `queue` decides exploration
/// order; `solver` is reused across the whole run (each feasibility check
/// is wrapped in its own push/pop).
pub fn run_function(
    functions: &[Function],
    entry: usize,
    queue: &mut dyn Queue,
    solver: &mut SolverGlue,
    max_depth: usize,
) -> Result<RunOutcome, EngineError> {
    let entry_fn = &functions[entry];
    queue.push(State::entry(entry, &entry_fn.params));

    let mut testcases = Vec::new();
    let mut abandoned = 0usize;

    while let Some(mut state) = queue.pop() {
        state.depth += 1;
        if state.depth > max_depth {
            abandoned += 1;
            continue;
        }

        match step(functions, &mut state, solver) {
            Ok(StepOutcome::Continue) => queue.push(state),
            Ok(StepOutcome::Branch(then_state, else_state)) => {
                if let Some(s) = then_state {
                    queue.push(s);
                }
                if let Some(s) = else_state {
                    queue.push(s);
                }
            }
            Ok(StepOutcome::Finished(tc)) => testcases.push(tc),
            Ok(StepOutcome::Abandoned) => abandoned += 1,
            Err(_) => abandoned += 1,
        }
    }

    Ok(RunOutcome { testcases, abandoned })
}

enum StepOutcome {
    Continue,
    Branch(Option<State>, Option<State>),
    Finished(Testcase),
    Abandoned,
}

fn step(functions: &[Function], state: &mut State, solver: &mut SolverGlue) -> Result<StepOutcome, EngineError> {
    let func = &functions[state.current().func_index];
    let block = func.block(state.current().block).clone();

    if state.current().pc < block.instrs.len() {
        let instr = block.instrs[state.current().pc].clone();
        state.current_mut().pc += 1;
        return handle_instr(functions, state, &instr);
    }

    match &block.term {
        Terminator::Jump { target } => {
            let target = *target;
            let prev = state.current().block;
            let frame = state.current_mut();
            frame.prev_block = Some(prev);
            frame.block = target;
            frame.pc = 0;
            Ok(StepOutcome::Continue)
        }
        Terminator::If { cond, then_block, else_block } => {
            let cond = state.current().resolve(cond);
            let then_block = *then_block;
            let else_block = *else_block;
            branch(state, solver, cond, then_block, else_block)
        }
        Terminator::Return { results } => handle_return(functions, state, results.clone(), solver),
    }
}

fn handle_instr(functions: &[Function], state: &mut State, instr: &Instr) -> Result<StepOutcome, EngineError> {
    let frame = state.current_mut();
    match instr {
        Instr::BinOp { result, op, left, right } => {
            let left = frame.resolve(left);
            let right = frame.resolve(right);
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::BinOp { result: result.clone(), op: op.clone(), left, right });
        }
        Instr::UnOp { result, op, arg } => {
            let arg = frame.resolve(arg);
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::UnOp { result: result.clone(), op: op.clone(), arg });
        }
        Instr::Convert { result, arg } => {
            let arg = frame.resolve(arg);
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::Convert { result: result.clone(), arg });
        }
        Instr::IndexAddr { result, array, index } => {
            let array = frame.resolve(array);
            let index = frame.resolve(index);
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::IndexAddr { result: result.clone(), array, index });
        }
        Instr::FieldAddr { result, base, field_index, .. } => {
            let base = frame.resolve(base);
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::FieldAddr { result: result.clone(), base, field_index: *field_index });
        }
        Instr::Phi { result, edges } => {
            let prev = frame.prev_block;
            let block = functions[frame.func_index].block(frame.block);
            let chosen = match prev.and_then(|p| block.preds.iter().position(|pred| *pred == p)) {
                Some(i) if i < edges.len() => frame.resolve(&edges[i]),
                _ => return Err(StructuralError::DanglingPhi { block: frame.block }.into()),
            };
            frame.bind(result.name.clone(), result.clone());
            frame.formulas.push(Formula::Alias { result: result.clone(), value: chosen });
        }
        Instr::Call { result, callee, args, same_package } => {
            if !same_package {
                return Err(BoundaryError::ExternalCall { callee: callee.clone() }.into());
            }
            if let Some((name, builtin_args)) = as_builtin(callee, args) {
                let resolved: Vec<Var> = builtin_args.iter().map(|a| frame.resolve(a)).collect();
                frame.bind(result.name.clone(), result.clone());
                frame.formulas.push(Formula::Call { result: result.clone(), callee: name, args: resolved });
                return Ok(StepOutcome::Continue);
            }
            return handle_call(functions, state, result.clone(), callee.clone(), args.clone());
        }
        Instr::Unsupported { .. } => {}
    }
    Ok(StepOutcome::Continue)
}

fn as_builtin(callee: &str, args: &[Var]) -> Option<(String, Vec<Var>)> {
    if matches!(callee, "real" | "imag" | "len") && args.len() == 1 {
        Some((callee.to_string(), args.to_vec()))
    } else {
        None
    }
}

fn handle_call(functions: &[Function], state: &mut State, result: Var, callee: String, args: Vec<Var>) -> Result<StepOutcome, EngineError> {
    let callee_index = functions
        .iter()
        .position(|f| f.name == callee)
        .ok_or(BoundaryError::ExternalCall { callee: callee.clone() })?;
    let callee_fn = &functions[callee_index];

    let resolved_args: Vec<Var> = args.iter().map(|a| state.current().resolve(a)).collect();
    let mut new_frame = crate::engine::frame::Frame::new_entry(callee_index, &callee_fn.params);
    for (param, actual) in callee_fn.params.iter().zip(resolved_args.iter()) {
        let fresh_name = state.make_fresh(&param.name);
        let fresh_var = Var::register(fresh_name, param.ty.clone());
        new_frame.bind(param.name.clone(), fresh_var.clone());
        new_frame.formulas.push(Formula::Alias { result: fresh_var, value: actual.clone() });
    }
    new_frame.result_binding = Some(result);
    state.call_stack.push(new_frame);
    Ok(StepOutcome::Continue)
}

fn handle_return(functions: &[Function], state: &mut State, results: Vec<Var>, solver: &mut SolverGlue) -> Result<StepOutcome, EngineError> {
    if results.len() > 1 {
        return Err(crate::errors::TypingError::MultiValueReturn { count: results.len() }.into());
    }
    let value = results.first().map(|v| state.current().resolve(v));
    let frame = state.current_mut();
    frame.formulas.push(Formula::Return { value: value.clone() });

    if state.call_stack.len() > 1 {
        let returning = state.call_stack.pop().expect("checked len > 1");
        state.history.extend(returning.formulas);
        if let (Some(binding), Some(value)) = (returning.result_binding, value) {
            let caller = state.current_mut();
            caller.bind(binding.name.clone(), binding.clone());
            caller.formulas.push(Formula::Alias { result: binding, value });
        }
        return Ok(StepOutcome::Continue);
    }

    finish_path(functions, state, solver)
}

fn branch(state: &mut State, solver: &mut SolverGlue, cond: Var, then_block: usize, else_block: usize) -> Result<StepOutcome, EngineError> {
    let base = state.path_formula();

    let then_state = {
        let mut s = state.clone();
        let prev = s.current().block;
        let frame = s.current_mut();
        frame.formulas.push(Formula::Condition { var: cond.clone(), expect: true });
        frame.prev_block = Some(prev);
        frame.block = then_block;
        frame.pc = 0;
        if is_feasible(&base, &Formula::Condition { var: cond.clone(), expect: true }, solver)? {
            Some(s)
        } else {
            None
        }
    };

    let else_state = {
        let mut s = state.clone();
        let prev = s.current().block;
        let frame = s.current_mut();
        frame.formulas.push(Formula::Condition { var: cond.clone(), expect: false });
        frame.prev_block = Some(prev);
        frame.block = else_block;
        frame.pc = 0;
        if is_feasible(&base, &Formula::Condition { var: cond, expect: false }, solver)? {
            Some(s)
        } else {
            None
        }
    };

    Ok(StepOutcome::Branch(then_state, else_state))
}

fn is_feasible(base: &Formula, extra: &Formula, solver: &mut SolverGlue) -> Result<bool, EngineError> {
    let mut ctx = EncodingContext::new();
    let base_term = base.encode(&mut ctx)?;
    let extra_term = extra.encode(&mut ctx)?;
    let decls = ctx.take_decls();
    let axioms = ctx.take_axioms();

    solver.push()?;
    for decl in &decls {
        solver.raw(decl)?;
    }
    for axiom in &axioms {
        solver.assert(axiom)?;
    }
    solver.assert(&base_term)?;
    solver.assert(&extra_term)?;
    let sat = solver.check_sat()?;
    solver.pop()?;
    Ok(sat)
}

fn finish_path(functions: &[Function], state: &mut State, solver: &mut SolverGlue) -> Result<StepOutcome, EngineError> {
    let entry_index = state.call_stack[0].func_index;
    let entry_fn = &functions[entry_index];

    let formula = state.path_formula();
    let mut vars = HashMap::new();
    formula.scan_vars(&mut vars)?;

    let mut ctx = EncodingContext::new();
    let term = formula.encode(&mut ctx)?;
    let decls = ctx.take_decls();
    let axioms = ctx.take_axioms();

    solver.push()?;
    for decl in &decls {
        solver.raw(decl)?;
    }
    for axiom in &axioms {
        solver.assert(axiom)?;
    }
    solver.assert(&term)?;
    let sat = solver.check_sat()?;
    let model = if sat {
        let mut wanted = entry_fn.params.clone();
        wanted.push(Var::result(entry_fn.result_ty.clone()));
        solver.get_model_text(&wanted)?
    } else {
        HashMap::new()
    };
    solver.pop()?;

    if !sat {
        return Ok(StepOutcome::Abandoned);
    }

    Ok(StepOutcome::Finished(Testcase {
        function: entry_fn.name.clone(),
        params: entry_fn.params.clone(),
        result_ty: entry_fn.result_ty.clone(),
        model,
    }))
}
