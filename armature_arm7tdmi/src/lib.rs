pub mod arm7tdmi;
