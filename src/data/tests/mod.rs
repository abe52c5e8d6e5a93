mod dataloader;
