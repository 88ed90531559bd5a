#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use dimodule::{
    declare, Arguments, Binding, Bindings, Container, Creator, InstantiateErrorKind, Module, Token, TokenSet, TypeSyntax,
};
use std::sync::Arc;

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<B>);

impl Creator for A {
    type Provides = Self;
    const PARAMETERS: usize = 2;

    fn create(mut arguments: Arguments) -> Result<Self::Provides, InstantiateErrorKind> {
        Ok(A(arguments.next()?, arguments.next()?))
    }
}

impl Creator for C {
    type Provides = Self;
    const PARAMETERS: usize = 1;

    fn create(mut arguments: Arguments) -> Result<Self::Provides, InstantiateErrorKind> {
        Ok(C(arguments.next()?))
    }
}

struct Tokens {
    a: Token<A>,
    b: Token<B>,
    c: Token<C>,
}

impl Tokens {
    fn new() -> Self {
        Self {
            a: Token::new("a"),
            b: Token::new("b"),
            c: Token::new("c"),
        }
    }
}

#[inline]
fn module_declare_bind(tokens: &Tokens) -> Module {
    declare(TokenSet::new().with("a", tokens.a).with("b", tokens.b).with("c", tokens.c))
        .bind("b", Binding::new(|syntax: TypeSyntax<B>| syntax.to_instance(|| B(2))))
        .unwrap()
        .bind("c", Binding::new(|syntax: TypeSyntax<C>| syntax.to_creator::<C>()))
        .unwrap()
}

#[inline]
fn module_combine(tokens: &Tokens) -> Module {
    let values = declare(TokenSet::new().with("b", tokens.b).with("c", tokens.c))
        .bind("b", Binding::new(|syntax: TypeSyntax<B>| syntax.to_instance(|| B(2))))
        .unwrap()
        .bind("c", Binding::new(|syntax: TypeSyntax<C>| syntax.to_creator::<C>()))
        .unwrap();
    let consumer = declare(TokenSet::new().with("a", tokens.a).with("b", tokens.b));
    values.combine(&consumer)
}

#[inline]
fn module_make(module: &Module) {
    let _ = module
        .make(Bindings::new().with("a", Binding::new(|syntax: TypeSyntax<A>| syntax.to_creator::<A>())))
        .unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = Tokens::new();

    let module = module_declare_bind(&tokens);
    module.injector().register::<A>(&["b", "c"]).unwrap();
    module.injector().register::<C>(&["b"]).unwrap();

    let finalized = module
        .make(Bindings::new().with("a", Binding::new(|syntax: TypeSyntax<A>| syntax.to_creator::<A>())))
        .unwrap();
    let mut container = Container::new();
    container.use_token(tokens.a).from(&finalized);

    let combined = module_combine(&tokens);

    c.bench_function("module_declare_bind", |b| b.iter(|| module_declare_bind(&tokens)))
        .bench_function("module_combine", |b| b.iter(|| module_combine(&tokens)))
        .bench_function("module_make", |b| b.iter(|| module_make(&module)))
        .bench_function("module_make_combined", |b| b.iter(|| module_make(&combined)))
        .bench_function("container_get", |b| {
            b.iter(|| {
                let mut container = Container::new();
                container.use_token(tokens.a).from(&finalized);
                let _ = container.get(&tokens.a).unwrap();
            })
        })
        .bench_function("container_get_with_cache", |b| b.iter(|| container.get(&tokens.a).unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
