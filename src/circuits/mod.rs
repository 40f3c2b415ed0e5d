// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`teleport_text::operations::Operation`).
//!
//! This module provides the `Circuit` structure, the description a
//! [`Backend`](crate::simulation::Backend) receives for execution.

use crate::core::{ClbitId, QubitId};
use crate::operations::{Gate, Operation};
use std::fmt;

/// An ordered sequence of operations over a fixed set of qubits and
/// classical bits.
///
/// Analogy: similar to `qiskit.QuantumCircuit`. Qubit and classical bit
/// counts grow to cover the highest index referenced by any operation.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
pub struct Circuit {
    /// Number of qubits (highest referenced `QubitId` + 1).
    num_qubits: usize,
    /// Number of classical bits (highest referenced `ClbitId` + 1).
    num_clbits: usize,
    /// The operations, in execution order.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self {
            num_qubits: 0,
            num_clbits: 0,
            operations: Vec::new(),
        }
    }

    /// Appends an operation, widening the qubit and classical registers as needed.
    pub fn add_operation(&mut self, op: Operation) {
        for QubitId(q) in op.involved_qubits() {
            self.num_qubits = self.num_qubits.max(q + 1);
        }
        if let Some(ClbitId(c)) = op.involved_clbit() {
            self.num_clbits = self.num_clbits.max(c + 1);
        }
        self.operations.push(op);
    }

    /// Number of qubits the circuit acts on.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of classical bits the circuit writes or reads.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Returns a slice containing the ordered sequence of operations in this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the total number of operations defined in the circuit.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self {
            circuit: Circuit::new(),
        }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }


    /// Prepares `target` in the real state `a|0> + b|1>`.
    pub fn initialize(self, target: QubitId, amplitudes: [f64; 2]) -> Self {
        self.add_op(Operation::Initialize { target, amplitudes })
    }

    /// Applies a single-qubit gate.
    pub fn gate(self, gate: Gate, target: QubitId) -> Self {
        self.add_op(Operation::Apply { target, gate })
    }

    /// Hadamard on `target`.
    pub fn h(self, target: QubitId) -> Self {
        self.gate(Gate::Hadamard, target)
    }

    /// Pauli X on `target`.
    pub fn x(self, target: QubitId) -> Self {
        self.gate(Gate::PauliX, target)
    }

    /// CNOT with `control` as control and `target` as target.
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.add_op(Operation::Controlled { control, target, gate: Gate::PauliX })
    }

    /// Applies `gate` to `target` when classical bit `clbit` holds 1.
    pub fn c_if(self, gate: Gate, target: QubitId, clbit: ClbitId) -> Self {
        self.add_op(Operation::Conditional { clbit, value: true, target, gate })
    }

    /// Measures `target` into `clbit`.
    pub fn measure(self, target: QubitId, clbit: ClbitId) -> Self {
        self.add_op(Operation::Measure { target, clbit })
    }

    /// Inserts a barrier.
    pub fn barrier(self) -> Self {
        self.add_op(Operation::Barrier)
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "Circuit[0 operations on 0 qubits]");
        }

        let ops = &self.operations;
        let num_ops = ops.len();
        let num_rows = self.num_qubits;

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] stores the gate/wire segment string
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        // v_connect[row][time] stores the vertical connector below this row at this time
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Initialize { target, .. } => {
                    op_grid[target.0][t] = format_gate("init");
                }
                Operation::Apply { target, gate } => {
                    op_grid[target.0][t] = format_gate(gate.symbol());
                }
                Operation::Controlled { control, target, gate } => {
                    op_grid[control.0][t] = format_gate("@");
                    op_grid[target.0][t] = format_gate(gate.symbol());
                    let r_min = control.0.min(target.0);
                    let r_max = control.0.max(target.0);
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                }
                Operation::Conditional { clbit, value, target, gate } => {
                    let label = format!("{}^{}={}", gate.symbol(), clbit, u8::from(*value));
                    op_grid[target.0][t] = format_gate(&label);
                }
                Operation::Measure { target, clbit } => {
                    op_grid[target.0][t] = format_gate(&format!("M>{}", clbit));
                }
                Operation::Barrier => {
                    for row in op_grid.iter_mut() {
                        row[t] = format_gate("░");
                    }
                }
            }
        }

        writeln!(
            f,
            "Circuit[{} operations on {} qubits, {} clbits]",
            num_ops, num_rows, self.num_clbits
        )?;
        let label_width = format!("{}", QubitId(num_rows.saturating_sub(1))).len() + 2;
        let label_padding = " ".repeat(label_width);
        for r in 0..num_rows {
            let label = format!("{}: ", QubitId(r));
            write!(f, "{:<width$}", label, width = label_width)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r + 1 < num_rows {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
