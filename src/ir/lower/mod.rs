mod expr;
mod stmt;

use super::{ClassUnit, Instruction, IrType, Method, Operand, VarTable};
use crate::diagnostics::CompileError;
use crate::parser::ast::{MethodDecl, Program};
use crate::typeck::env::ClassDescriptor;
use crate::typeck::infer::TypeResolver;
use crate::typeck::types::Type;

/// Source of temporary numbers and label suffixes for one compilation.
///
/// Temporaries and control-flow labels draw from the same sequence, so numbers never
/// repeat anywhere in a class.
#[derive(Debug, Default)]
pub struct TempCounter {
    next: usize,
}

impl TempCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }
}

/// Result of lowering one expression.
///
/// `computation` must run before `code` is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprResult {
    pub code: Operand,
    pub computation: Vec<Instruction>,
}

impl ExprResult {
    pub fn operand(code: Operand) -> Self {
        Self { code, computation: Vec::new() }
    }
}

struct LowerContext<'a> {
    desc: &'a ClassDescriptor,
    resolver: TypeResolver<'a>,
    temps: &'a mut TempCounter,
    return_type: IrType,
    code: Vec<Instruction>,
}

impl LowerContext<'_> {
    fn own_type(&self) -> IrType {
        IrType::Object(self.desc.class_name.clone())
    }

    fn fresh_temp(&mut self, ty: IrType) -> Operand {
        Operand::temp(self.temps.next(), ty)
    }

    fn emit(&mut self, inst: Instruction) {
        self.code.push(inst);
    }

    fn emit_all(&mut self, insts: Vec<Instruction>) {
        self.code.extend(insts);
    }
}

/// Lower the whole class. Semantic diagnostics are not consulted: any tree the parser
/// accepts is lowered, and only shapes with no possible encoding are fatal.
pub fn lower_program(program: &Program, desc: &ClassDescriptor) -> Result<ClassUnit, CompileError> {
    let mut temps = TempCounter::new();
    let class = &program.class.node;
    let mut methods = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        methods.push(lower_method(&method.node, desc, &mut temps)?);
    }
    Ok(ClassUnit {
        name: desc.class_name.clone(),
        super_class: desc.super_class.clone(),
        imports: desc.import_paths.clone(),
        fields: desc.fields.iter().map(|f| (f.name.clone(), IrType::from(&f.ty))).collect(),
        methods,
    })
}

fn lower_method(
    decl: &MethodDecl,
    desc: &ClassDescriptor,
    temps: &mut TempCounter,
) -> Result<Method, CompileError> {
    let name = decl.name.node.clone();
    let _span = tracing::debug_span!("lower_method", method = %name).entered();

    let params: Vec<(String, IrType)> = decl
        .params
        .iter()
        .map(|p| (p.name.node.clone(), IrType::from(&Type::from(&p.ty.node))))
        .collect();
    let return_type = IrType::from(&Type::from(&decl.return_type.node));

    let mut cx = LowerContext {
        desc,
        resolver: TypeResolver::for_method(desc, &name),
        temps,
        return_type: return_type.clone(),
        code: Vec::new(),
    };
    for stmt in &decl.body {
        cx.lower_stmt(&stmt.node)?;
    }
    let mut instructions = cx.code;
    if !instructions.iter().any(Instruction::is_return) {
        instructions.push(Instruction::Return { value: None, ty: IrType::Void });
    } else if !instructions.last().is_some_and(Instruction::is_return) {
        // control reaches the end of the body, at least through a trailing label
        instructions.push(closing_return(&return_type));
    }

    let var_table = VarTable::build(decl.is_static, &desc.class_name, &params, &instructions);
    tracing::debug!(instructions = instructions.len(), registers = var_table.len(), "lowered method");

    Ok(Method {
        name,
        is_public: decl.is_public,
        is_static: decl.is_static,
        params,
        return_type,
        instructions,
        var_table,
    })
}

/// Return appended when the body can run past its last instruction. Scalar methods
/// return a zero value; reference methods get a bare `ret.V`.
fn closing_return(ty: &IrType) -> Instruction {
    match ty {
        IrType::Int32 => Instruction::Return { value: Some(Operand::int(0)), ty: IrType::Int32 },
        IrType::Bool => Instruction::Return { value: Some(Operand::boolean(false)), ty: IrType::Bool },
        _ => Instruction::Return { value: None, ty: IrType::Void },
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn counter_is_monotonic() {
        let mut temps = TempCounter::new();
        assert_eq!(temps.next(), 0);
        assert_eq!(temps.next(), 1);
        assert_eq!(temps.next(), 2);
    }

    #[test]
    fn missing_return_is_synthesized() {
        let unit = lower_source("class A { void f() { } }");
        assert_eq!(method_lines(&unit, "f"), vec!["ret.V"]);
    }

    #[test]
    fn branch_to_end_of_body_gets_a_closing_return() {
        let unit = lower_source("class A { int f(boolean b) { if (b) return 1; else return 2; } }");
        let lines = method_lines(&unit, "f");
        assert_eq!(lines[lines.len() - 2..], ["endif0:", "ret.i32 0.i32"]);

        let unit = lower_source("class A { void g(boolean b) { int x; if (b) return; else x = 1; } }");
        let lines = method_lines(&unit, "g");
        assert_eq!(lines[lines.len() - 2..], ["endif0:", "ret.V"]);
        assert_eq!(lines.iter().filter(|l| *l == "ret.V").count(), 2);
    }

    #[test]
    fn class_shape() {
        let unit = lower_source("import a.b.Io; class A extends Io { int x; int[] y; int f(int p) { return p; } }");
        assert_eq!(unit.name, "A");
        assert_eq!(unit.super_class.as_deref(), Some("Io"));
        assert_eq!(unit.imports, vec!["a.b.Io"]);
        assert_eq!(unit.fields[0], ("x".to_string(), IrType::Int32));
        assert_eq!(unit.methods[0].params, vec![("p".to_string(), IrType::Int32)]);
    }

    #[test]
    fn counter_spans_methods() {
        let unit = lower_source("class A { int f(int a) { return a + 1; } int g(int a) { return a + 2; } }");
        assert_eq!(method_lines(&unit, "f")[0], "tmp0.i32 :=.i32 a.i32 +.i32 1.i32");
        assert_eq!(method_lines(&unit, "g")[0], "tmp1.i32 :=.i32 a.i32 +.i32 2.i32");
    }

    #[test]
    fn ir_text_layout() {
        let unit = lower_source("import io; class A { int x; public static void main(String[] args) { io.println(1); } }");
        let text = unit.to_string();
        assert!(text.starts_with("import io;\n\nA extends Object {\n"));
        assert!(text.contains(".field public x.i32;\n"));
        assert!(text.contains(".construct A().V {\n    invokespecial(this, \"<init>\").V;\n}\n"));
        assert!(text.contains(".method public static main(args.array.String).V {\n"));
        assert!(text.contains("    invokestatic(io, \"println\", 1.i32).V;\n"));
        assert!(text.trim_end().ends_with('}'));
    }

    #[test]
    fn var_table_follows_lowering() {
        let unit = lower_source("class A { int f(int a) { int b; b = a * 2; return b; } }");
        let table = &unit.methods[0].var_table;
        assert_eq!(table.register("this"), Some(0));
        assert_eq!(table.register("a"), Some(1));
        assert_eq!(table.register("tmp0"), Some(2));
        assert_eq!(table.register("b"), Some(3));
    }
}
