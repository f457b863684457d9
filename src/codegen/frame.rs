use crate::ir::{Call, CallKind, Instruction, Method, Operand};

/// Declared limits of one method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub stack: usize,
    pub locals: usize,
}

impl Frame {
    pub fn for_method(method: &Method) -> Self {
        let frame = Self { stack: stack_limit(&method.instructions), locals: method.var_table.locals_limit() };
        tracing::trace!(method = %method.name, stack = frame.stack, locals = frame.locals, "computed frame limits");
        frame
    }
}

/// Running stack height and the highest value it reached.
///
/// The height never goes down: every value an instruction leaves behind is assumed to
/// stay on the stack. Transient depth inside one instruction (both operands of a binary
/// operator, a receiver plus its arguments) is recorded as a peak over the running height.
#[derive(Debug, Default)]
struct StackEstimate {
    height: usize,
    max: usize,
}

impl StackEstimate {
    fn push(&mut self, n: usize) {
        self.height += n;
        self.max = self.max.max(self.height);
    }

    fn peak(&mut self, n: usize) {
        self.max = self.max.max(self.height + n);
    }

    fn visit(&mut self, inst: &Instruction) {
        match inst {
            Instruction::Assign { dest, rhs, .. } => {
                if let Operand::ArrayElement { .. } = dest {
                    // array ref and index sit under the value
                    self.height += 2;
                    self.visit(rhs);
                    self.height -= 2;
                    self.peak(3);
                } else {
                    self.visit(rhs);
                }
            }
            Instruction::Value(operand) => {
                if let Operand::ArrayElement { .. } = operand {
                    self.peak(2);
                }
                self.push(1);
            }
            Instruction::BinaryOp { .. } | Instruction::UnaryOp { .. } => {
                self.peak(2);
                self.push(1);
            }
            Instruction::Return { value: Some(_), .. } => self.push(1),
            Instruction::Return { value: None, .. } => {}
            Instruction::Call(call) => self.peak(call_depth(call)),
            Instruction::GetField { .. } => self.peak(1),
            Instruction::PutField { .. } => self.peak(2),
            Instruction::CondGoto { .. } => self.peak(1),
            Instruction::Goto(_) | Instruction::Label(_) => {}
        }
    }
}

fn call_depth(call: &Call) -> usize {
    let receiver = match call.kind {
        CallKind::Virtual | CallKind::Special | CallKind::ArrayLength | CallKind::New => 1,
        CallKind::Static => 0,
    };
    (receiver + call.args.len()).max(1)
}

/// Conservative operand-stack limit for a method body.
pub fn stack_limit(code: &[Instruction]) -> usize {
    let mut estimate = StackEstimate::default();
    for inst in code {
        estimate.visit(inst);
    }
    estimate.max
}
